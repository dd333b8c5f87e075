//! Flux balance constraints package (`fbc`).
//!
//! # Rationale
//!
//! Flux balance analysis annotates a reaction network with flux bounds and
//! one or more linear objectives. The package adds attributes to core
//! species and reactions, so several rules here are bound to core kinds and
//! read the package's plugin node instead of the object's own attributes.
//!
//! Rules live in the package range 2000000 to 2999999.

use crate::templates::{
    attribute_group, HasItems, NoEmptyLists, OneOf, Parses, RefersTo, Required, ValueKind,
};
use sbml_lint_core::{
    AllOf, Category, DeclarationGroup, HasAttributes, HasChildren, HasExtensions, HasId,
    ObjectKind, ObjectRef, PackageDecl, PackageTag, RuleDecl,
};

/// Declares the package: its id range and the core kinds it extends.
pub(crate) fn package() -> PackageDecl {
    PackageDecl::new(PackageTag::Fbc, 2_000_000..=2_999_999)
        .extends(ObjectKind::Model, ObjectKind::FbcModelPlugin)
        .extends(ObjectKind::Species, ObjectKind::FbcSpeciesPlugin)
        .extends(ObjectKind::Reaction, ObjectKind::FbcReactionPlugin)
}

/// Reads an attribute the package attached to a core object.
fn fbc_attribute<'a>(obj: &ObjectRef<'a>, name: &str) -> Option<&'a str> {
    obj.node()
        .extension(PackageTag::Fbc)
        .and_then(|plugin| plugin.attribute(name))
}

fn fbc(target: ObjectKind) -> DeclarationGroup {
    DeclarationGroup::package(PackageTag::Fbc, target)
}

fn flux_bound(id: u32, attribute: &'static str, summary: &'static str) -> RuleDecl {
    RuleDecl::check(id, Category::GeneralConsistency, summary, move |ctx, reaction| {
        fbc_attribute(&reaction, attribute)
            .map_or(true, |bound| ctx.resolves_to(bound, &[ObjectKind::Parameter]))
    })
}

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        fbc(ObjectKind::Model).rule(RuleDecl::check(
            2_020_101,
            Category::GeneralConsistency,
            "model declares fbc strictness",
            |_, model| {
                model
                    .extension(PackageTag::Fbc)
                    .and_then(|plugin| plugin.flag("strict"))
                    .is_some()
            },
        )),
        fbc(ObjectKind::Species)
            .rule(RuleDecl::check(
                2_020_301,
                Category::GeneralConsistency,
                "species charge is an integer",
                |_, species| {
                    fbc_attribute(&species, "charge")
                        .map_or(true, |charge| ValueKind::Integer.accepts(charge))
                },
            ))
            .rule(RuleDecl::check(
                2_020_302,
                Category::GeneralConsistency,
                "species chemical formula is well formed",
                |_, species| {
                    fbc_attribute(&species, "chemicalFormula")
                        .map_or(true, |formula| ValueKind::ChemicalFormula.accepts(formula))
                },
            )),
        fbc(ObjectKind::Reaction)
            .rule(flux_bound(
                2_020_401,
                "lowerFluxBound",
                "lower flux bound names a parameter",
            ))
            .rule(flux_bound(
                2_020_402,
                "upperFluxBound",
                "upper flux bound names a parameter",
            )),
        fbc(ObjectKind::FbcModelPlugin)
            .rule(
                RuleDecl::check(
                    2_020_201,
                    Category::GeneralConsistency,
                    "active objective names an objective",
                    |_, plugin| {
                        let objectives = plugin.children_in("listOfObjectives");
                        objectives.is_empty()
                            || plugin.attribute("activeObjective").is_some_and(|active| {
                                objectives.iter().any(|o| o.id() == Some(active))
                            })
                    },
                )
                .detail("activeObjective"),
            )
            .rule(RuleDecl::new(
                2_020_202,
                Category::GeneralConsistency,
                "fbc lists are not empty",
                NoEmptyLists,
            )),
        fbc(ObjectKind::Objective)
            .rule(
                RuleDecl::new(
                    2_020_501,
                    Category::GeneralConsistency,
                    "objective type is maximize or minimize",
                    OneOf::new("type", &["maximize", "minimize"]),
                )
                .detail("type"),
            )
            .rule(RuleDecl::new(
                2_020_502,
                Category::GeneralConsistency,
                "objective has a flux objective",
                HasItems("listOfFluxObjectives"),
            ))
            .rule(RuleDecl::new(
                2_020_503,
                Category::GeneralConsistency,
                "objective attribute group",
                attribute_group(&["id", "type"], &["type"]),
            )),
        fbc(ObjectKind::FluxObjective)
            .rule(
                RuleDecl::new(
                    2_020_601,
                    Category::GeneralConsistency,
                    "flux objective names a reaction",
                    RefersTo::new("reaction", &[ObjectKind::Reaction]),
                )
                .detail("reaction"),
            )
            .rule(
                RuleDecl::new(
                    2_020_602,
                    Category::GeneralConsistency,
                    "flux objective coefficient is a double",
                    AllOf::new()
                        .and(Required("coefficient"))
                        .and(Parses::new("coefficient", ValueKind::Double)),
                )
                .detail("coefficient"),
            ),
        fbc(ObjectKind::GeneProduct)
            .rule(RuleDecl::new(
                2_020_701,
                Category::GeneralConsistency,
                "gene product has a label",
                Required("label"),
            ))
            .rule(
                RuleDecl::new(
                    2_020_702,
                    Category::GeneralConsistency,
                    "associated species names a species",
                    RefersTo::new("associatedSpecies", &[ObjectKind::Species]),
                )
                .detail("associatedSpecies"),
            ),
    ]
}
