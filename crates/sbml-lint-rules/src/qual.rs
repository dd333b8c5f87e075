//! Qualitative models package (`qual`).
//!
//! # Rationale
//!
//! A qualitative model describes species that take integer levels and
//! transitions that move them. Each transition reads inputs, writes outputs
//! and picks a result level from its function terms, falling back on exactly
//! one default term. Levels are non-negative integers; an initial level may
//! not exceed the maximum.
//!
//! Rules live in the package range 3000000 to 3999999 and are only resolved
//! when the package is active for the run.

use crate::templates::{
    attribute_group, HasItems, MathSet, MathYields, NoEmptyLists, OneOf, Parses, RefersTo,
    Required, TargetNotConstant, ValueKind,
};
use sbml_lint_core::{
    AllOf, Category, CheckContext, DeclarationGroup, HasAttributes, HasChildren, ObjectKind,
    ObjectRef, PackageDecl, PackageTag, Predicate, RuleDecl,
};

/// Declares the package: its id range and where it attaches to core.
pub(crate) fn package() -> PackageDecl {
    PackageDecl::new(PackageTag::Qual, 3_000_000..=3_999_999)
        .extends(ObjectKind::Model, ObjectKind::QualModelPlugin)
}

const SPECIES_REFERENCE: RefersTo =
    RefersTo::new("qualitativeSpecies", &[ObjectKind::QualitativeSpecies]);

/// `resultLevel` is present and a non-negative integer.
fn result_level() -> AllOf {
    AllOf::new()
        .and(Required("resultLevel"))
        .and(Parses::new("resultLevel", ValueKind::NonNegativeInteger))
}

/// A consuming input drains its species, so the species cannot be constant.
#[derive(Debug, Clone, Copy)]
struct ConsumptionNotConstant;

impl Predicate for ConsumptionNotConstant {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.attribute("transitionEffect") != Some("consumption")
            || TargetNotConstant("qualitativeSpecies").holds(ctx, obj)
    }
}

fn qual(target: ObjectKind) -> DeclarationGroup {
    DeclarationGroup::package(PackageTag::Qual, target)
}

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        qual(ObjectKind::QualModelPlugin).rule(RuleDecl::new(
            3_020_101,
            Category::GeneralConsistency,
            "qual lists are not empty",
            NoEmptyLists,
        )),
        qual(ObjectKind::QualitativeSpecies)
            .rule(RuleDecl::new(
                3_020_301,
                Category::GeneralConsistency,
                "qualitative species attribute group",
                attribute_group(
                    &["id", "compartment", "constant"],
                    &["compartment", "constant", "initialLevel", "maxLevel"],
                ),
            ))
            .rule(
                RuleDecl::new(
                    3_020_302,
                    Category::GeneralConsistency,
                    "qualitative species compartment names a compartment",
                    RefersTo::new("compartment", &[ObjectKind::Compartment]),
                )
                .detail("compartment"),
            )
            .rule(RuleDecl::check(
                3_020_303,
                Category::GeneralConsistency,
                "initial level does not exceed max level",
                |_, qs| match (qs.number("initialLevel"), qs.number("maxLevel")) {
                    (Some(initial), Some(max)) => initial <= max,
                    _ => true,
                },
            ))
            .rule(
                RuleDecl::new(
                    3_020_304,
                    Category::GeneralConsistency,
                    "initial level is a non-negative integer",
                    Parses::new("initialLevel", ValueKind::NonNegativeInteger),
                )
                .detail("initialLevel"),
            )
            .rule(
                RuleDecl::new(
                    3_020_305,
                    Category::GeneralConsistency,
                    "max level is a non-negative integer",
                    Parses::new("maxLevel", ValueKind::NonNegativeInteger),
                )
                .detail("maxLevel"),
            ),
        qual(ObjectKind::Transition)
            .rule(RuleDecl::new(
                3_020_401,
                Category::GeneralConsistency,
                "transition has an output",
                HasItems("listOfOutputs"),
            ))
            .rule(RuleDecl::check(
                3_020_402,
                Category::GeneralConsistency,
                "transition has exactly one default term",
                |_, t| {
                    t.children_in("listOfFunctionTerms")
                        .iter()
                        .filter(|term| term.kind() == ObjectKind::DefaultTerm)
                        .count()
                        == 1
                },
            ))
            .rule(RuleDecl::new(
                3_020_403,
                Category::GeneralConsistency,
                "transition lists are not empty",
                NoEmptyLists,
            )),
        qual(ObjectKind::Input)
            .rule(
                RuleDecl::new(
                    3_020_501,
                    Category::GeneralConsistency,
                    "input names a qualitative species",
                    SPECIES_REFERENCE,
                )
                .detail("qualitativeSpecies"),
            )
            .rule(
                RuleDecl::new(
                    3_020_502,
                    Category::GeneralConsistency,
                    "input transition effect is none or consumption",
                    OneOf::new("transitionEffect", &["none", "consumption"]),
                )
                .detail("transitionEffect"),
            )
            .rule(
                RuleDecl::new(
                    3_020_503,
                    Category::GeneralConsistency,
                    "input sign is a known value",
                    OneOf::new("sign", &["positive", "negative", "dual", "unknown"]),
                )
                .detail("sign"),
            )
            .rule(
                RuleDecl::new(
                    3_020_504,
                    Category::GeneralConsistency,
                    "input threshold level is a non-negative integer",
                    Parses::new("thresholdLevel", ValueKind::NonNegativeInteger),
                )
                .detail("thresholdLevel"),
            )
            .rule(RuleDecl::new(
                3_020_505,
                Category::GeneralConsistency,
                "input attribute group",
                attribute_group(
                    &["qualitativeSpecies", "transitionEffect"],
                    &["qualitativeSpecies", "transitionEffect", "sign", "thresholdLevel"],
                ),
            ))
            .rule(
                RuleDecl::new(
                    3_020_506,
                    Category::GeneralConsistency,
                    "consumed species is not constant",
                    ConsumptionNotConstant,
                )
                .detail("qualitativeSpecies"),
            ),
        qual(ObjectKind::Output)
            .rule(
                RuleDecl::new(
                    3_020_601,
                    Category::GeneralConsistency,
                    "output names a qualitative species",
                    SPECIES_REFERENCE,
                )
                .detail("qualitativeSpecies"),
            )
            .rule(
                RuleDecl::new(
                    3_020_602,
                    Category::GeneralConsistency,
                    "output transition effect is production or assignmentLevel",
                    OneOf::new("transitionEffect", &["production", "assignmentLevel"]),
                )
                .detail("transitionEffect"),
            )
            .rule(
                RuleDecl::new(
                    3_020_603,
                    Category::GeneralConsistency,
                    "output level is a non-negative integer",
                    Parses::new("outputLevel", ValueKind::NonNegativeInteger),
                )
                .detail("outputLevel"),
            )
            .rule(
                RuleDecl::new(
                    3_020_604,
                    Category::GeneralConsistency,
                    "output species is not constant",
                    TargetNotConstant("qualitativeSpecies"),
                )
                .detail("qualitativeSpecies"),
            )
            .rule(RuleDecl::new(
                3_020_605,
                Category::GeneralConsistency,
                "output attribute group",
                attribute_group(
                    &["qualitativeSpecies", "transitionEffect"],
                    &["qualitativeSpecies", "transitionEffect", "outputLevel"],
                ),
            )),
        qual(ObjectKind::FunctionTerm)
            .rule(RuleDecl::new(
                3_020_701,
                Category::GeneralConsistency,
                "function term result level is a non-negative integer",
                result_level(),
            ))
            .rule(RuleDecl::new(
                3_020_702,
                Category::GeneralConsistency,
                "function term math is boolean",
                MathYields::BOOLEAN,
            ))
            .rule(RuleDecl::new(
                3_020_703,
                Category::GeneralConsistency,
                "function term has math",
                MathSet,
            )),
        qual(ObjectKind::DefaultTerm).rule(RuleDecl::new(
            3_020_801,
            Category::GeneralConsistency,
            "default term result level is a non-negative integer",
            result_level(),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use crate::testing::{failures, run};
    use sbml_lint_core::{Document, Math, Node, ObjectKind, PackageTag};

    fn species(id: &str, constant: &str) -> Node {
        Node::new(ObjectKind::QualitativeSpecies)
            .with_attr("id", id)
            .with_attr("compartment", "c")
            .with_attr("constant", constant)
            .with_attr("maxLevel", "2")
    }

    fn input(species: &str, effect: &str) -> Node {
        Node::new(ObjectKind::Input)
            .with_attr("qualitativeSpecies", species)
            .with_attr("transitionEffect", effect)
    }

    fn output(species: &str) -> Node {
        Node::new(ObjectKind::Output)
            .with_attr("qualitativeSpecies", species)
            .with_attr("transitionEffect", "assignmentLevel")
    }

    fn default_term() -> Node {
        Node::new(ObjectKind::DefaultTerm).with_attr("resultLevel", "0")
    }

    fn document(transition: Node) -> Document {
        document_with(vec![species("a", "true"), species("b", "false")], transition)
    }

    fn document_with(all_species: Vec<Node>, transition: Node) -> Document {
        let plugin = all_species
            .into_iter()
            .fold(Node::new(ObjectKind::QualModelPlugin), |p, qs| {
                p.with_child("listOfQualitativeSpecies", qs)
            })
            .with_child("listOfTransitions", transition);
        let model = Node::new(ObjectKind::Model)
            .with_child(
                "listOfCompartments",
                Node::new(ObjectKind::Compartment)
                    .with_attr("id", "c")
                    .with_attr("constant", "true")
                    .with_attr("size", "1"),
            )
            .with_extension(PackageTag::Qual, plugin);
        Document::new(3, 1, Some(model)).with_package(PackageTag::Qual)
    }

    fn transition() -> Node {
        Node::new(ObjectKind::Transition)
            .with_attr("id", "t")
            .with_child("listOfInputs", input("a", "none"))
            .with_child("listOfOutputs", output("b"))
            .with_child(
                "listOfFunctionTerms",
                Node::new(ObjectKind::FunctionTerm)
                    .with_attr("resultLevel", "1")
                    .with_math(Math::apply("geq", vec![Math::ci("a"), Math::cn(1.0)])),
            )
            .with_child("listOfFunctionTerms", default_term())
    }

    #[test]
    fn well_formed_transition() {
        assert!(failures(&run(&document(transition()))).is_empty());
    }

    #[test]
    fn inactive_package_is_not_checked() {
        let t = Node::new(ObjectKind::Transition).with_attr("id", "t");
        let doc = document(t);
        let without = Document::new(3, 1, doc.model().cloned());
        assert!(failures(&run(&without)).is_empty());
        assert_eq!(failures(&run(&doc)), vec![3_020_401, 3_020_402]);
    }

    #[test]
    fn inputs_and_outputs() {
        let t = Node::new(ObjectKind::Transition)
            .with_attr("id", "t")
            .with_child("listOfInputs", input("a", "consumption").with_attr("sign", "maybe"))
            .with_child("listOfOutputs", output("a").with_attr("outputLevel", "-1"))
            .with_child("listOfFunctionTerms", default_term());
        assert_eq!(
            failures(&run(&document(t))),
            vec![3_020_503, 3_020_506, 3_020_603, 3_020_604]
        );
    }

    #[test]
    fn levels_are_ordered() {
        let doc = document_with(
            vec![
                species("a", "true").with_attr("initialLevel", "3"),
                species("b", "false").with_attr("maxLevel", "many"),
            ],
            transition(),
        );
        assert_eq!(failures(&run(&doc)), vec![3_020_303, 3_020_305]);
    }
}
