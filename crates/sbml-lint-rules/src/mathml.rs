//! MathML consistency.
//!
//! # Rationale
//!
//! Math may only call user functions that exist and may only mention
//! identifiers that denote a value: compartments, species, parameters,
//! reactions, local parameters of the enclosing kinetic law and, from
//! level 3, species references. Expressions assigned to a variable must be
//! numeric.

use crate::templates::MathYields;
use sbml_lint_core::{
    Category, CheckContext, DeclarationGroup, HasChildren, HasId, HasMath, ObjectKind, ObjectRef,
    Predicate, RuleDecl, Target,
};

/// Every kind that may carry math.
const MATH_KINDS: &[ObjectKind] = &[
    ObjectKind::FunctionDefinition,
    ObjectKind::InitialAssignment,
    ObjectKind::AssignmentRule,
    ObjectKind::RateRule,
    ObjectKind::AlgebraicRule,
    ObjectKind::Constraint,
    ObjectKind::KineticLaw,
    ObjectKind::Trigger,
    ObjectKind::Delay,
    ObjectKind::Priority,
    ObjectKind::EventAssignment,
];

/// Math outside function definitions, where every identifier must resolve.
const EXPRESSION_KINDS: &[ObjectKind] = &[
    ObjectKind::InitialAssignment,
    ObjectKind::AssignmentRule,
    ObjectKind::RateRule,
    ObjectKind::AlgebraicRule,
    ObjectKind::Constraint,
    ObjectKind::KineticLaw,
    ObjectKind::Trigger,
    ObjectKind::Delay,
    ObjectKind::Priority,
    ObjectKind::EventAssignment,
];

/// Math whose value is assigned to or used as a number.
const NUMERIC_KINDS: &[ObjectKind] = &[
    ObjectKind::InitialAssignment,
    ObjectKind::AssignmentRule,
    ObjectKind::RateRule,
    ObjectKind::KineticLaw,
    ObjectKind::Delay,
    ObjectKind::Priority,
    ObjectKind::EventAssignment,
];

const VALUES: &[ObjectKind] = &[
    ObjectKind::Compartment,
    ObjectKind::Species,
    ObjectKind::Parameter,
    ObjectKind::Reaction,
];

/// Every called function names a function definition.
#[derive(Debug, Clone, Copy)]
pub struct CallsResolve;

impl Predicate for CallsResolve {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.math().map_or(true, |math| {
            math.called_functions()
                .into_iter()
                .all(|f| ctx.resolves_to(f, &[ObjectKind::FunctionDefinition]))
        })
    }
}

/// Every free `<ci>` denotes a value.
#[derive(Debug, Clone, Copy)]
pub struct IdentifiersResolve;

impl Predicate for IdentifiersResolve {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        let Some(math) = obj.math() else {
            return true;
        };
        let locals: Vec<&str> = if obj.kind() == ObjectKind::KineticLaw {
            obj.children_in("listOfLocalParameters")
                .iter()
                .filter_map(|p| p.id())
                .collect()
        } else {
            Vec::new()
        };
        math.identifiers().into_iter().all(|id| {
            locals.contains(&id)
                || ctx.resolves_to(id, VALUES)
                || (ctx.level() >= 3 && ctx.resolves_to(id, &[ObjectKind::SpeciesReference]))
        })
    }
}

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        DeclarationGroup::core(Target::AnyOf(MATH_KINDS)).rule(RuleDecl::new(
            10214,
            Category::MathmlConsistency,
            "called functions are defined",
            CallsResolve,
        )),
        DeclarationGroup::core(Target::AnyOf(EXPRESSION_KINDS)).rule(RuleDecl::new(
            10215,
            Category::MathmlConsistency,
            "identifiers in math denote values",
            IdentifiersResolve,
        )),
        DeclarationGroup::core(Target::AnyOf(NUMERIC_KINDS)).rule(RuleDecl::new(
            10217,
            Category::MathmlConsistency,
            "assigned math is numeric",
            MathYields::NUMERIC,
        )),
    ]
}
