//! Global parameters.

use crate::templates::{attribute_group, sbo_rule, Parses, Required, ValueKind};
use sbml_lint_core::{Category, DeclarationGroup, Gate, ObjectKind, RuleDecl};

const KNOWN: &[&str] = &["value", "units", "constant"];

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![DeclarationGroup::core(ObjectKind::Parameter)
        .rule(
            RuleDecl::new(
                20702,
                Category::GeneralConsistency,
                "parameter value is a double",
                Parses::new("value", ValueKind::Double),
            )
            .detail("value"),
        )
        .rule(
            RuleDecl::new(
                20706,
                Category::GeneralConsistency,
                "parameter attribute group",
                attribute_group(&["id", "constant"], KNOWN),
            )
            .gate(Gate::LevelAtLeast(3)),
        )
        .rule(RuleDecl::new(
            80701,
            Category::ModelingPractice,
            "parameter units are declared",
            Required("units"),
        ))
        .rule(sbo_rule(10703, "parameter sboTerm is well formed"))]
}
