//! Species.
//!
//! # Rationale
//!
//! A species lives in a compartment and starts from an amount or a
//! concentration, never both. A concentration is meaningless in a
//! zero-dimensional compartment.

use crate::templates::{attribute_group, is_assigned, sbo_rule, RefersTo};
use sbml_lint_core::{
    Category, DeclarationGroup, Gate, HasAttributes, HasId, ObjectKind, RuleDecl,
};

const REQUIRED: &[&str] = &[
    "id",
    "compartment",
    "hasOnlySubstanceUnits",
    "boundaryCondition",
    "constant",
];

const KNOWN: &[&str] = &[
    "compartment",
    "initialAmount",
    "initialConcentration",
    "substanceUnits",
    "hasOnlySubstanceUnits",
    "boundaryCondition",
    "constant",
    "conversionFactor",
];

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![DeclarationGroup::core(ObjectKind::Species)
        .rule(
            RuleDecl::new(
                20601,
                Category::GeneralConsistency,
                "species compartment names a compartment",
                RefersTo::new("compartment", &[ObjectKind::Compartment]),
            )
            .detail("compartment"),
        )
        .rule(RuleDecl::check(
            20609,
            Category::GeneralConsistency,
            "species does not set both initial amount and concentration",
            |_, s| !(s.is_set("initialAmount") && s.is_set("initialConcentration")),
        ))
        .rule(
            RuleDecl::check(
                20611,
                Category::GeneralConsistency,
                "species in a zero-dimensional compartment has no initial concentration",
                |ctx, s| {
                    !s.is_set("initialConcentration")
                        || s.attribute("compartment")
                            .and_then(|c| ctx.index().find(c))
                            .filter(|c| c.kind() == ObjectKind::Compartment)
                            .map_or(true, |c| c.number("spatialDimensions") != Some(0.0))
                },
            )
            .gate(Gate::LevelAtLeast(2)),
        )
        .rule(
            RuleDecl::new(
                20617,
                Category::GeneralConsistency,
                "species conversionFactor names a parameter",
                RefersTo::new("conversionFactor", &[ObjectKind::Parameter]),
            )
            .gate(Gate::LevelAtLeast(3))
            .detail("conversionFactor"),
        )
        .rule(
            RuleDecl::new(
                20623,
                Category::GeneralConsistency,
                "species attribute group",
                attribute_group(REQUIRED, KNOWN),
            )
            .gate(Gate::LevelAtLeast(3)),
        )
        .rule(RuleDecl::check(
            80601,
            Category::ModelingPractice,
            "species initial value is set",
            |ctx, s| {
                s.is_set("initialAmount")
                    || s.is_set("initialConcentration")
                    || s.id()
                        .zip(ctx.model())
                        .is_some_and(|(id, model)| is_assigned(model, id))
            },
        ))
        .rule(sbo_rule(10713, "species sboTerm is well formed"))]
}

#[cfg(test)]
mod tests {
    use crate::testing::{failures, run};
    use sbml_lint_core::{Document, Node, ObjectKind};

    fn species(id: &str, compartment: &str) -> Node {
        Node::new(ObjectKind::Species)
            .with_attr("id", id)
            .with_attr("compartment", compartment)
            .with_attr("hasOnlySubstanceUnits", "false")
            .with_attr("boundaryCondition", "false")
            .with_attr("constant", "false")
    }

    fn model(dimensions: &str, s: Node) -> Document {
        let mut c = Node::new(ObjectKind::Compartment)
            .with_attr("id", "c")
            .with_attr("constant", "true")
            .with_attr("spatialDimensions", dimensions);
        if dimensions != "0" {
            c = c.with_attr("size", "1");
        }
        Document::new(
            3,
            2,
            Some(
                Node::new(ObjectKind::Model)
                    .with_child("listOfCompartments", c)
                    .with_child("listOfSpecies", s),
            ),
        )
    }

    #[test]
    fn well_formed_species() {
        let s = species("s", "c").with_attr("initialAmount", "1");
        assert!(failures(&run(&model("3", s))).is_empty());
    }

    #[test]
    fn dangling_compartment_and_both_initial_values() {
        let s = species("s", "nowhere")
            .with_attr("initialAmount", "1")
            .with_attr("initialConcentration", "1");
        assert_eq!(failures(&run(&model("3", s))), vec![20601, 20609]);
    }

    #[test]
    fn concentration_in_point_compartment() {
        let s = species("s", "c").with_attr("initialConcentration", "1");
        assert_eq!(failures(&run(&model("0", s))), vec![20611]);
    }

    #[test]
    fn missing_initial_value_is_a_warning() {
        let log = run(&model("3", species("s", "c")));
        assert_eq!(failures(&log), vec![80601]);
        assert_eq!(log.entries()[0].severity(), sbml_lint_core::Severity::Warning);
    }
}
