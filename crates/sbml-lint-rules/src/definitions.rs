//! Function and unit definitions.
//!
//! # Rationale
//!
//! Function definitions must wrap their body in a `<lambda>` (from level 2)
//! and may not call themselves. Unit definitions must not shadow a
//! predefined unit kind and must list at least one unit; each unit names a
//! predefined kind and, in level 3, spells out every numeric attribute.

use crate::identifiers;
use crate::templates::{attribute_group, sbo_rule};
use sbml_lint_core::utils::is_base_unit;
use sbml_lint_core::{
    Category, DeclarationGroup, Gate, HasAttributes, HasChildren, HasId, HasMath, Math,
    ObjectKind, RuleDecl,
};

const UNIT_ATTRIBUTES: &[&str] = &["kind", "exponent", "scale", "multiplier"];

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        DeclarationGroup::core(ObjectKind::FunctionDefinition)
            .rule(
                RuleDecl::check(
                    20301,
                    Category::GeneralConsistency,
                    "function definition math is a lambda",
                    |_, def| matches!(def.math(), Some(Math::Lambda { .. })),
                )
                .gate(Gate::LevelAtLeast(2)),
            )
            .rule(RuleDecl::check(
                20303,
                Category::GeneralConsistency,
                "function definition does not call itself",
                |_, def| {
                    let (Some(id), Some(math)) = (def.id(), def.math()) else {
                        return true;
                    };
                    !math.called_functions().contains(&id)
                },
            ))
            .rule(sbo_rule(10702, "function definition sboTerm is well formed")),
        DeclarationGroup::core(ObjectKind::UnitDefinition)
            .rule(
                RuleDecl::check(
                    20401,
                    Category::GeneralConsistency,
                    "unit definition does not redefine a base unit",
                    |ctx, def| def.id().map_or(true, |id| !is_base_unit(id, ctx.level())),
                )
                .detail("id"),
            )
            .rule(
                RuleDecl::check(
                    20409,
                    Category::GeneralConsistency,
                    "unit definition lists at least one unit",
                    |_, def| !def.children_in("listOfUnits").is_empty(),
                )
                .gate(Gate::LevelAtLeast(2)),
            )
            .rule(identifiers::unit_sid_unique())
            .rule(identifiers::unit_sid_syntax()),
        DeclarationGroup::core(ObjectKind::Unit)
            .rule(
                RuleDecl::check(
                    20410,
                    Category::GeneralConsistency,
                    "unit kind is a predefined unit",
                    |ctx, unit| {
                        unit.attribute("kind")
                            .map_or(true, |kind| is_base_unit(kind, ctx.level()))
                    },
                )
                .detail("kind"),
            )
            .rule(
                RuleDecl::new(
                    20421,
                    Category::GeneralConsistency,
                    "unit spells out kind, exponent, scale and multiplier",
                    attribute_group(UNIT_ATTRIBUTES, UNIT_ATTRIBUTES),
                )
                .gate(Gate::LevelAtLeast(3)),
            ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::testing::{failures, run};
    use sbml_lint_core::{Document, Math, Node, ObjectKind};

    fn unit(kind: &str) -> Node {
        Node::new(ObjectKind::Unit)
            .with_attr("kind", kind)
            .with_attr("exponent", "1")
            .with_attr("scale", "0")
            .with_attr("multiplier", "1")
    }

    fn with_definition(definition: Node) -> Document {
        Document::new(
            3,
            2,
            Some(Node::new(ObjectKind::Model).with_child("listOfUnitDefinitions", definition)),
        )
    }

    #[test]
    fn unit_definition_rules() {
        let ok = Node::new(ObjectKind::UnitDefinition)
            .with_attr("id", "per_second")
            .with_child("listOfUnits", unit("second"));
        assert!(failures(&run(&with_definition(ok))).is_empty());

        let bad = Node::new(ObjectKind::UnitDefinition)
            .with_attr("id", "mole")
            .with_child("listOfUnits", unit("fortnight"));
        assert_eq!(failures(&run(&with_definition(bad))), vec![20401, 20410]);

        let empty = Node::new(ObjectKind::UnitDefinition).with_attr("id", "nothing");
        assert_eq!(failures(&run(&with_definition(empty))), vec![20409]);
    }

    #[test]
    fn level_3_units_spell_out_attributes() {
        let partial = Node::new(ObjectKind::UnitDefinition)
            .with_attr("id", "u")
            .with_child("listOfUnits", Node::new(ObjectKind::Unit).with_attr("kind", "second"));
        assert_eq!(failures(&run(&with_definition(partial))), vec![20421]);
    }

    #[test]
    fn function_definitions() {
        let recursive = Node::new(ObjectKind::FunctionDefinition)
            .with_attr("id", "f")
            .with_math(Math::Lambda {
                bvars: vec!["x".to_string()],
                body: Box::new(Math::Call {
                    function: "f".to_string(),
                    args: vec![Math::ci("x")],
                }),
            });
        let bare = Node::new(ObjectKind::FunctionDefinition)
            .with_attr("id", "g")
            .with_math(Math::cn(1.0));
        let model = Node::new(ObjectKind::Model)
            .with_child("listOfFunctionDefinitions", recursive)
            .with_child("listOfFunctionDefinitions", bare);
        let log = run(&Document::new(3, 2, Some(model)));
        assert_eq!(failures(&log), vec![20303, 20301]);
    }
}
