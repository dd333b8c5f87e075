//! Units consistency between an assignment and its target.
//!
//! # Rationale
//!
//! Full unit inference over arbitrary expressions is out of reach without a
//! unit algebra, so these rules only judge the cases where the units of an
//! expression are evident: a lone `<ci>` (whose units are those declared on
//! the referenced object) or a lone `<cn>` carrying `sbml:units`. When
//! either side is undeclared the rule passes.
//!
//! A species stands for an amount only when `hasOnlySubstanceUnits` is true
//! or its compartment has no spatial dimensions. Any other species is a
//! concentration in substance per compartment size, a derived unit with no
//! single name to compare, so it counts as undeclared.
//!
//! | Target kind | Assignment rule | Initial assignment | Event assignment |
//! |-------------|-----------------|--------------------|------------------|
//! | compartment | 10511 | 10521 | 10561 |
//! | species | 10512 | 10522 | 10562 |
//! | parameter | 10513 | 10523 | 10563 |

use sbml_lint_core::{
    Category, CheckContext, HasAttributes, HasMath, IdIndex, Math, Node, ObjectKind, ObjectRef,
    Predicate, RuleDecl,
};

/// Returns the units declared on a variable.
///
/// Amount species declare substance units; compartments and parameters
/// declare plain `units`. Concentration species yield `None`.
#[must_use]
pub fn declared_units<'a>(index: &IdIndex<'a>, node: &'a Node) -> Option<&'a str> {
    match node.kind() {
        ObjectKind::Species if is_amount(index, node) => node.attribute("substanceUnits"),
        ObjectKind::Compartment | ObjectKind::Parameter | ObjectKind::LocalParameter => {
            node.attribute("units")
        }
        _ => None,
    }
}

fn is_amount(index: &IdIndex<'_>, species: &Node) -> bool {
    if species.flag("hasOnlySubstanceUnits") == Some(true) {
        return true;
    }
    species
        .attribute("compartment")
        .and_then(|id| index.find(id))
        .filter(|node| node.kind() == ObjectKind::Compartment)
        .and_then(|compartment| compartment.number("spatialDimensions"))
        .is_some_and(|dimensions| dimensions == 0.0)
}

/// Returns the units of an expression when they are evident from its shape.
#[must_use]
pub fn expression_units<'a>(index: &IdIndex<'a>, math: &'a Math) -> Option<&'a str> {
    match math {
        Math::Ci(id) => index.find(id).and_then(|node| declared_units(index, node)),
        Math::Cn { units, .. } => units.as_deref(),
        _ => None,
    }
}

/// The math of the object must carry the units declared on the `attribute`
/// target, when that target is of kind `target`.
#[derive(Debug, Clone, Copy)]
pub struct UnitsMatch {
    attribute: &'static str,
    target: ObjectKind,
}

impl UnitsMatch {
    /// Creates the template.
    #[must_use]
    pub const fn new(attribute: &'static str, target: ObjectKind) -> Self {
        Self { attribute, target }
    }
}

impl Predicate for UnitsMatch {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        let Some(target) = obj
            .attribute(self.attribute)
            .and_then(|id| ctx.index().find(id))
            .filter(|node| node.kind() == self.target)
        else {
            return true;
        };
        let Some(expected) = declared_units(ctx.index(), target) else {
            return true;
        };
        obj.node()
            .math()
            .and_then(|math| expression_units(ctx.index(), math))
            .map_or(true, |found| found == expected)
    }
}

/// Declares the three units rules of one assignment kind, for compartment,
/// species and parameter targets in that order, with consecutive ids from
/// `first`.
pub(crate) fn unit_rules(
    first: u32,
    attribute: &'static str,
    summaries: [&'static str; 3],
) -> Vec<RuleDecl> {
    const TARGETS: [ObjectKind; 3] = [
        ObjectKind::Compartment,
        ObjectKind::Species,
        ObjectKind::Parameter,
    ];
    TARGETS
        .into_iter()
        .zip(summaries)
        .zip(first..)
        .map(|((target, summary), id)| {
            RuleDecl::new(
                id,
                Category::UnitsConsistency,
                summary,
                UnitsMatch::new(attribute, target),
            )
            .detail(attribute)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::outcomes;
    use sbml_lint_core::Document;

    fn parameter(id: &str, units: &str) -> Node {
        Node::new(ObjectKind::Parameter)
            .with_attr("id", id)
            .with_attr("units", units)
    }

    fn doc(math: Math) -> Document {
        let model = Node::new(ObjectKind::Model)
            .with_child("listOfParameters", parameter("t", "second"))
            .with_child("listOfParameters", parameter("n", "mole"))
            .with_child("listOfParameters", Node::new(ObjectKind::Parameter).with_attr("id", "u"))
            .with_child(
                "listOfRules",
                Node::new(ObjectKind::AssignmentRule)
                    .with_attr("variable", "t")
                    .with_math(math),
            );
        Document::new(3, 1, Some(model))
    }

    fn check(math: Math) -> bool {
        let pred = UnitsMatch::new("variable", ObjectKind::Parameter);
        outcomes(&doc(math), ObjectKind::AssignmentRule, &pred)[0]
    }

    #[test]
    fn identifier_units_are_compared() {
        assert!(!check(Math::ci("n")));
        assert!(check(Math::ci("t")));
    }

    #[test]
    fn literal_units_are_compared() {
        assert!(!check(Math::Cn {
            value: 1.0,
            units: Some("mole".to_string())
        }));
        assert!(check(Math::Cn {
            value: 1.0,
            units: Some("second".to_string())
        }));
    }

    #[test]
    fn undeclared_or_complex_passes() {
        assert!(check(Math::ci("u")));
        assert!(check(Math::cn(2.0)));
        assert!(check(Math::apply("times", vec![Math::ci("n"), Math::ci("n")])));
    }

    #[test]
    fn other_target_kinds_pass() {
        let pred = UnitsMatch::new("variable", ObjectKind::Species);
        assert_eq!(
            outcomes(&doc(Math::ci("n")), ObjectKind::AssignmentRule, &pred),
            vec![true]
        );
    }

    fn species_doc(only_substance: &str, dimensions: &str, math: Math) -> Document {
        let model = Node::new(ObjectKind::Model)
            .with_child(
                "listOfCompartments",
                Node::new(ObjectKind::Compartment)
                    .with_attr("id", "c")
                    .with_attr("spatialDimensions", dimensions),
            )
            .with_child(
                "listOfSpecies",
                Node::new(ObjectKind::Species)
                    .with_attr("id", "s")
                    .with_attr("compartment", "c")
                    .with_attr("substanceUnits", "mole")
                    .with_attr("hasOnlySubstanceUnits", only_substance),
            )
            .with_child(
                "listOfInitialAssignments",
                Node::new(ObjectKind::InitialAssignment)
                    .with_attr("symbol", "s")
                    .with_math(math),
            );
        Document::new(3, 1, Some(model))
    }

    fn check_species(only_substance: &str, dimensions: &str, units: &str) -> bool {
        let pred = UnitsMatch::new("symbol", ObjectKind::Species);
        let math = Math::Cn {
            value: 1.0,
            units: Some(units.to_string()),
        };
        let doc = species_doc(only_substance, dimensions, math);
        outcomes(&doc, ObjectKind::InitialAssignment, &pred)[0]
    }

    #[test]
    fn amount_species_use_substance_units() {
        assert!(check_species("true", "3", "mole"));
        assert!(!check_species("true", "3", "second"));
    }

    #[test]
    fn concentration_species_are_not_judged() {
        assert!(check_species("false", "3", "mole"));
        assert!(check_species("false", "3", "second"));
    }

    #[test]
    fn dimensionless_compartment_holds_amounts() {
        assert!(!check_species("false", "0", "second"));
        assert!(check_species("false", "0", "mole"));
    }

    #[test]
    fn rule_ids_are_consecutive() {
        let ids: Vec<u32> = unit_rules(10561, "variable", ["a", "b", "c"])
            .iter()
            .map(|r| r.id().get())
            .collect();
        assert_eq!(ids, vec![10561, 10562, 10563]);
    }
}
