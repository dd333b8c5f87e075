//! Events and their parts.
//!
//! # Rationale
//!
//! An event fires when its trigger turns true, optionally after a delay,
//! and then applies its event assignments. Event assignments change the
//! state of the model, so they must target a non-constant variable; from
//! level 3 on a species reference's stoichiometry is such a variable too.

use crate::templates::{
    attribute_group, refers_to_variable, sbo_rule, HasItems, MathSet, MathYields, Required,
    TargetNotConstant,
};
use crate::units::unit_rules;
use sbml_lint_core::{AllOf, Category, DeclarationGroup, Gate, ObjectKind, RuleDecl};

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        DeclarationGroup::core(ObjectKind::Event)
            .rule(RuleDecl::new(
                21201,
                Category::GeneralConsistency,
                "event has a trigger",
                HasItems("trigger"),
            ))
            .rule(
                RuleDecl::new(
                    21203,
                    Category::GeneralConsistency,
                    "event has an event assignment",
                    HasItems("listOfEventAssignments"),
                )
                .gate(Gate::LevelExactly(2)),
            )
            .rule(
                RuleDecl::new(
                    21206,
                    Category::GeneralConsistency,
                    "event declares useValuesFromTriggerTime",
                    Required("useValuesFromTriggerTime"),
                )
                .gate(Gate::LevelAtLeast(3)),
            )
            .rule(sbo_rule(10710, "event sboTerm is well formed")),
        DeclarationGroup::core(ObjectKind::Trigger)
            .rule(RuleDecl::new(
                21202,
                Category::GeneralConsistency,
                "trigger math is boolean",
                MathYields::BOOLEAN,
            ))
            .rule(RuleDecl::new(
                21209,
                Category::GeneralConsistency,
                "trigger has math",
                MathSet,
            ))
            .rule(
                RuleDecl::new(
                    21226,
                    Category::GeneralConsistency,
                    "trigger declares persistent and initialValue",
                    AllOf::new()
                        .and(Required("persistent"))
                        .and(Required("initialValue")),
                )
                .gate(Gate::LevelAtLeast(3)),
            )
            .rule(sbo_rule(10716, "trigger sboTerm is well formed")),
        DeclarationGroup::core(ObjectKind::Delay)
            .rule(RuleDecl::new(
                21210,
                Category::GeneralConsistency,
                "delay has math",
                MathSet,
            ))
            .rule(sbo_rule(10717, "delay sboTerm is well formed")),
        DeclarationGroup::core(ObjectKind::Priority).rule(
            RuleDecl::new(
                21231,
                Category::GeneralConsistency,
                "priority has math",
                MathSet,
            )
            .gate(Gate::LevelAtLeast(3)),
        ),
        DeclarationGroup::core(ObjectKind::EventAssignment)
            .rule(
                RuleDecl::new(
                    21211,
                    Category::GeneralConsistency,
                    "event assignment variable names a variable",
                    refers_to_variable("variable"),
                )
                .detail("variable"),
            )
            .rule(
                RuleDecl::new(
                    21212,
                    Category::GeneralConsistency,
                    "event assignment variable is not constant",
                    TargetNotConstant("variable"),
                )
                .detail("variable"),
            )
            .rule(RuleDecl::new(
                21213,
                Category::GeneralConsistency,
                "event assignment has math",
                MathSet,
            ))
            .rule(
                RuleDecl::new(
                    21214,
                    Category::GeneralConsistency,
                    "event assignment attribute group",
                    attribute_group(&["variable"], &["variable"]),
                )
                .gate(Gate::LevelAtLeast(3)),
            )
            .rule(sbo_rule(10711, "event assignment sboTerm is well formed"))
            .rules(unit_rules(
                10561,
                "variable",
                [
                    "event assignment units match its compartment",
                    "event assignment units match its species",
                    "event assignment units match its parameter",
                ],
            )),
    ]
}
