//! Initial assignments, rules and constraints.
//!
//! # Rationale
//!
//! Assignments target model variables. A variable is set by at most one
//! initial assignment, by at most one rule, and never by both an initial
//! assignment and an assignment rule. Rules that change a variable over
//! time may not target a constant.

use crate::identifiers;
use crate::templates::{
    refers_to_variable, sbo_rule, MathSet, MathYields, Scope, TargetNotConstant, UniqueIn,
};
use crate::units::unit_rules;
use sbml_lint_core::{
    Category, DeclarationGroup, HasAttributes, HasChildren, ObjectKind, RuleDecl, Target,
};

const RULES: &[ObjectKind] = &[
    ObjectKind::AssignmentRule,
    ObjectKind::RateRule,
    ObjectKind::AlgebraicRule,
];

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        DeclarationGroup::core(ObjectKind::InitialAssignment)
            .rule(
                RuleDecl::new(
                    20801,
                    Category::GeneralConsistency,
                    "initial assignment symbol names a variable",
                    refers_to_variable("symbol"),
                )
                .detail("symbol"),
            )
            .rule(
                RuleDecl::new(
                    20802,
                    Category::GeneralConsistency,
                    "one initial assignment per symbol",
                    UniqueIn::new(Scope::Model, "listOfInitialAssignments", "symbol"),
                )
                .detail("symbol"),
            )
            .rule(
                RuleDecl::check(
                    20803,
                    Category::GeneralConsistency,
                    "initial assignment symbol is not an assignment rule variable",
                    |ctx, ia| {
                        let (Some(symbol), Some(model)) = (ia.attribute("symbol"), ctx.model())
                        else {
                            return true;
                        };
                        !model.children_in("listOfRules").iter().any(|rule| {
                            rule.kind() == ObjectKind::AssignmentRule
                                && rule.attribute("variable") == Some(symbol)
                        })
                    },
                )
                .detail("symbol"),
            )
            .rule(RuleDecl::new(
                20804,
                Category::GeneralConsistency,
                "initial assignment has math",
                MathSet,
            ))
            .rule(sbo_rule(10704, "initial assignment sboTerm is well formed"))
            .rules(unit_rules(
                10521,
                "symbol",
                [
                    "initial assignment units match its compartment",
                    "initial assignment units match its species",
                    "initial assignment units match its parameter",
                ],
            )),
        DeclarationGroup::core(ObjectKind::AssignmentRule)
            .rule(
                RuleDecl::new(
                    20901,
                    Category::GeneralConsistency,
                    "assignment rule variable names a variable",
                    refers_to_variable("variable"),
                )
                .detail("variable"),
            )
            .rule(
                RuleDecl::new(
                    20903,
                    Category::GeneralConsistency,
                    "assignment rule variable is not constant",
                    TargetNotConstant("variable"),
                )
                .detail("variable"),
            )
            .rules(unit_rules(
                10511,
                "variable",
                [
                    "assignment rule units match its compartment",
                    "assignment rule units match its species",
                    "assignment rule units match its parameter",
                ],
            )),
        DeclarationGroup::core(ObjectKind::RateRule)
            .rule(
                RuleDecl::new(
                    20902,
                    Category::GeneralConsistency,
                    "rate rule variable names a variable",
                    refers_to_variable("variable"),
                )
                .detail("variable"),
            )
            .rule(
                RuleDecl::new(
                    20904,
                    Category::GeneralConsistency,
                    "rate rule variable is not constant",
                    TargetNotConstant("variable"),
                )
                .detail("variable"),
            ),
        DeclarationGroup::core(Target::AnyOf(RULES))
            .rule(identifiers::rule_variable_unique())
            .rule(RuleDecl::new(
                20907,
                Category::GeneralConsistency,
                "rule has math",
                MathSet,
            ))
            .rule(sbo_rule(10705, "rule sboTerm is well formed")),
        DeclarationGroup::core(ObjectKind::Constraint)
            .rule(RuleDecl::new(
                21001,
                Category::GeneralConsistency,
                "constraint math is boolean",
                MathYields::BOOLEAN,
            ))
            .rule(RuleDecl::new(
                21007,
                Category::GeneralConsistency,
                "constraint has math",
                MathSet,
            ))
            .rule(sbo_rule(10706, "constraint sboTerm is well formed")),
    ]
}
