//! Compartments.
//!
//! # Rationale
//!
//! A zero-dimensional compartment has no size, so setting one is an error.
//! Every other compartment should have its size fixed somewhere, either on
//! the element or by an initial assignment or assignment rule.

use crate::templates::{attribute_group, is_assigned, sbo_rule};
use sbml_lint_core::{
    Category, DeclarationGroup, Gate, HasAttributes, HasId, ObjectKind, RuleDecl,
};

const KNOWN: &[&str] = &["spatialDimensions", "size", "units", "constant"];

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![DeclarationGroup::core(ObjectKind::Compartment)
        .rule(
            RuleDecl::check(
                20501,
                Category::GeneralConsistency,
                "zero-dimensional compartment has no size",
                |_, c| c.number("spatialDimensions") != Some(0.0) || !c.is_set("size"),
            )
            .gate(Gate::LevelAtLeast(2)),
        )
        .rule(
            RuleDecl::new(
                20517,
                Category::GeneralConsistency,
                "compartment attribute group",
                attribute_group(&["id", "constant"], KNOWN),
            )
            .gate(Gate::LevelAtLeast(3)),
        )
        .rule(RuleDecl::check(
            80501,
            Category::ModelingPractice,
            "compartment size is set",
            |ctx, c| {
                c.is_set("size")
                    || c.number("spatialDimensions") == Some(0.0)
                    || c.id()
                        .zip(ctx.model())
                        .is_some_and(|(id, model)| is_assigned(model, id))
            },
        ))
        .rule(sbo_rule(10712, "compartment sboTerm is well formed"))]
}
