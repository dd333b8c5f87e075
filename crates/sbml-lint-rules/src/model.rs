//! Document and model structure.
//!
//! # Rationale
//!
//! These rules check the top of the tree: a document carries a model, a
//! model with species also has compartments, and list containers are not
//! left empty. The empty-list rule only exists in level 3 version 1; later
//! versions allow empty `listOf*` elements.

use crate::overdetermined::Overdetermined;
use crate::templates::{sbo_rule, HasItems, NoEmptyLists, RefersTo};
use sbml_lint_core::{
    Category, DeclarationGroup, Gate, HasChildren, ObjectKind, RuleDecl, Target,
};

/// Kinds that own `listOf*` containers in core.
const CONTAINERS: &[ObjectKind] = &[
    ObjectKind::Model,
    ObjectKind::UnitDefinition,
    ObjectKind::Reaction,
    ObjectKind::KineticLaw,
    ObjectKind::Event,
];

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        DeclarationGroup::core(ObjectKind::Document).rule(
            RuleDecl::new(
                20201,
                Category::GeneralConsistency,
                "document contains a model",
                HasItems("model"),
            )
            .gate(Gate::LevelVersionAtMost(3, 1)),
        ),
        DeclarationGroup::core(ObjectKind::Model)
            .rule(RuleDecl::check(
                20204,
                Category::GeneralConsistency,
                "species imply compartments",
                |_, model| {
                    model.children_in("listOfSpecies").is_empty()
                        || !model.children_in("listOfCompartments").is_empty()
                },
            ))
            .rule(
                RuleDecl::new(
                    20216,
                    Category::GeneralConsistency,
                    "model conversionFactor names a parameter",
                    RefersTo::new("conversionFactor", &[ObjectKind::Parameter]),
                )
                .gate(Gate::LevelAtLeast(3))
                .detail("conversionFactor"),
            )
            .rule(RuleDecl::new(
                10601,
                Category::OverdeterminedModel,
                "model is not overdetermined",
                Overdetermined,
            ))
            .rule(sbo_rule(10701, "model sboTerm is well formed")),
        DeclarationGroup::core(Target::AnyOf(CONTAINERS)).rule(
            RuleDecl::new(
                20203,
                Category::GeneralConsistency,
                "listOf containers are not empty",
                NoEmptyLists,
            )
            .gate(Gate::LevelVersionExactly(3, 1)),
        ),
    ]
}
