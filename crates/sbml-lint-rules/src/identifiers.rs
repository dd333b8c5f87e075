//! Identifier syntax, uniqueness and unit references.
//!
//! # Rationale
//!
//! SBML has two global namespaces: `SId`s shared by every identified model
//! object and `UnitSId`s for unit definitions. Local parameters and rule
//! targets add two scoped uniqueness constraints. The scoped and unit rules
//! are declared here but attached to the groups of the kinds they check.

use crate::templates::{Parses, Scope, UniqueIn, ValueKind};
use sbml_lint_core::utils::is_base_unit;
use sbml_lint_core::{
    Category, CheckContext, DeclarationGroup, HasAttributes, ObjectKind, ObjectRef, Predicate,
    RuleDecl, Target,
};

/// Kinds whose `id` lives in the model-wide `SId` namespace.
const IDENTIFIED: &[ObjectKind] = &[
    ObjectKind::Model,
    ObjectKind::FunctionDefinition,
    ObjectKind::Compartment,
    ObjectKind::Species,
    ObjectKind::Parameter,
    ObjectKind::Reaction,
    ObjectKind::SpeciesReference,
    ObjectKind::ModifierSpeciesReference,
    ObjectKind::Event,
];

/// Kinds carrying attributes that name units.
const UNIT_REFERRERS: &[ObjectKind] = &[
    ObjectKind::Model,
    ObjectKind::Compartment,
    ObjectKind::Species,
    ObjectKind::Parameter,
    ObjectKind::LocalParameter,
];

/// Attributes whose value is a `UnitSId`.
const UNIT_ATTRIBUTES: &[&str] = &[
    "units",
    "substanceUnits",
    "spatialSizeUnits",
    "timeUnits",
    "volumeUnits",
    "areaUnits",
    "lengthUnits",
    "extentUnits",
];

/// The object's id is the first carrier of its value in its namespace.
#[derive(Debug, Clone, Copy)]
pub struct UniqueId;

impl Predicate for UniqueId {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        !ctx.index().is_duplicate(obj.node())
    }
}

/// Every unit attribute names a unit definition or a predefined unit.
#[derive(Debug, Clone, Copy)]
pub struct UnitsResolve;

impl Predicate for UnitsResolve {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        UNIT_ATTRIBUTES
            .iter()
            .filter_map(|attr| obj.attribute(attr))
            .all(|units| {
                is_base_unit(units, ctx.level())
                    || ctx.index().unit_definition(units).is_some()
                    || (ctx.level() < 3
                        && matches!(units, "substance" | "time" | "volume" | "area" | "length"))
            })
    }
}

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        DeclarationGroup::core(Target::AnyOf(IDENTIFIED))
            .rule(
                RuleDecl::new(
                    10301,
                    Category::IdentifierConsistency,
                    "SId is unique in the model",
                    UniqueId,
                )
                .detail("id"),
            )
            .rule(
                RuleDecl::new(
                    10309,
                    Category::IdentifierConsistency,
                    "id follows the SId syntax",
                    Parses::new("id", ValueKind::SId),
                )
                .detail("id"),
            ),
        DeclarationGroup::core(Target::AnyOf(UNIT_REFERRERS)).rule(RuleDecl::new(
            10313,
            Category::IdentifierConsistency,
            "unit references resolve",
            UnitsResolve,
        )),
    ]
}

/// 10302, attached to unit definitions.
pub(crate) fn unit_sid_unique() -> RuleDecl {
    RuleDecl::new(
        10302,
        Category::IdentifierConsistency,
        "UnitSId is unique",
        UniqueId,
    )
    .detail("id")
}

/// 10311, attached to unit definitions.
pub(crate) fn unit_sid_syntax() -> RuleDecl {
    RuleDecl::new(
        10311,
        Category::IdentifierConsistency,
        "id follows the UnitSId syntax",
        Parses::new("id", ValueKind::UnitSId),
    )
    .detail("id")
}

/// 10303, attached to local parameters.
pub(crate) fn local_parameter_unique() -> RuleDecl {
    RuleDecl::new(
        10303,
        Category::IdentifierConsistency,
        "local parameter ids are unique in their kinetic law",
        UniqueIn::new(Scope::Parent, "listOfLocalParameters", "id"),
    )
    .detail("id")
}

/// 10304, attached to assignment and rate rules.
pub(crate) fn rule_variable_unique() -> RuleDecl {
    RuleDecl::new(
        10304,
        Category::IdentifierConsistency,
        "no two rules share a variable",
        UniqueIn::new(Scope::Model, "listOfRules", "variable"),
    )
    .detail("variable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::outcomes;
    use sbml_lint_core::{Document, Node};

    fn with_units(units: &str) -> Node {
        Node::new(ObjectKind::Parameter)
            .with_attr("id", "p")
            .with_attr("units", units)
    }

    #[test]
    fn duplicate_ids_across_kinds() {
        let model = Node::new(ObjectKind::Model)
            .with_child("listOfCompartments", Node::new(ObjectKind::Compartment).with_attr("id", "x"))
            .with_child("listOfParameters", Node::new(ObjectKind::Parameter).with_attr("id", "x"));
        let doc = Document::new(3, 1, Some(model));
        assert_eq!(outcomes(&doc, ObjectKind::Compartment, &UniqueId), vec![true]);
        assert_eq!(outcomes(&doc, ObjectKind::Parameter, &UniqueId), vec![false]);
    }

    #[test]
    fn unit_definitions_have_their_own_namespace() {
        let model = Node::new(ObjectKind::Model)
            .with_child("listOfUnitDefinitions", Node::new(ObjectKind::UnitDefinition).with_attr("id", "x"))
            .with_child("listOfParameters", Node::new(ObjectKind::Parameter).with_attr("id", "x"));
        let doc = Document::new(3, 1, Some(model));
        assert_eq!(outcomes(&doc, ObjectKind::UnitDefinition, &UniqueId), vec![true]);
        assert_eq!(outcomes(&doc, ObjectKind::Parameter, &UniqueId), vec![true]);
    }

    #[test]
    fn unit_references() {
        let model = Node::new(ObjectKind::Model)
            .with_child("listOfUnitDefinitions", Node::new(ObjectKind::UnitDefinition).with_attr("id", "per_second"))
            .with_child("listOfParameters", with_units("per_second"))
            .with_child("listOfParameters", with_units("mole"))
            .with_child("listOfParameters", with_units("furlong"))
            .with_child("listOfParameters", with_units("substance"));
        let l3 = Document::new(3, 1, Some(model.clone()));
        assert_eq!(
            outcomes(&l3, ObjectKind::Parameter, &UnitsResolve),
            vec![true, true, false, false]
        );
        let l2 = Document::new(2, 4, Some(model));
        assert_eq!(
            outcomes(&l2, ObjectKind::Parameter, &UnitsResolve),
            vec![true, true, false, true]
        );
    }
}
