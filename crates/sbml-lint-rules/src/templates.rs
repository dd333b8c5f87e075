//! Parameterized predicates shared by the rule modules.
//!
//! Most rules in the catalog are one of a handful of shapes: an attribute must
//! be present, must parse as some lexical type, must name an object of some
//! kind, or a math child must exist and yield a boolean. Each shape is a
//! small struct implementing [`Predicate`] so that one template can back many
//! rule ids.

use sbml_lint_core::utils::{is_chemical_formula, is_sbo_term, is_sid, is_unit_sid};
use sbml_lint_core::{
    AllOf, Category, CheckContext, Gate, HasAttributes, HasChildren, HasMath, MathType, Node,
    ObjectKind, ObjectRef, Predicate, RuleDecl,
};

/// Attributes every SBML object may carry.
pub const SBASE_ATTRIBUTES: &[&str] = &["metaid", "sboTerm", "id", "name"];

/// Lexical type an attribute value must parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `xsd:double`, including `INF` and `NaN`.
    Double,
    /// `xsd:integer`.
    Integer,
    /// `xsd:nonNegativeInteger`.
    NonNegativeInteger,
    /// `xsd:boolean`.
    Boolean,
    /// The `SId` production.
    SId,
    /// The `UnitSId` production.
    UnitSId,
    /// `SBO:nnnnnnn`.
    SboTerm,
    /// Hill-system chemical formula.
    ChemicalFormula,
}

impl ValueKind {
    /// Returns true if `value` is a valid lexical form.
    #[must_use]
    pub fn accepts(self, value: &str) -> bool {
        match self {
            Self::Double => value.trim().parse::<f64>().is_ok(),
            Self::Integer => value.trim().parse::<i64>().is_ok(),
            Self::NonNegativeInteger => value.trim().parse::<u64>().is_ok(),
            Self::Boolean => matches!(value.trim(), "true" | "false" | "1" | "0"),
            Self::SId => is_sid(value),
            Self::UnitSId => is_unit_sid(value),
            Self::SboTerm => is_sbo_term(value),
            Self::ChemicalFormula => is_chemical_formula(value),
        }
    }
}

/// The attribute must be present.
#[derive(Debug, Clone, Copy)]
pub struct Required(pub &'static str);

impl Predicate for Required {
    fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.is_set(self.0)
    }
}

/// The attribute, when present, must parse as `kind`.
#[derive(Debug, Clone, Copy)]
pub struct Parses {
    attribute: &'static str,
    kind: ValueKind,
}

impl Parses {
    /// Creates the template.
    #[must_use]
    pub const fn new(attribute: &'static str, kind: ValueKind) -> Self {
        Self { attribute, kind }
    }
}

impl Predicate for Parses {
    fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.attribute(self.attribute)
            .map_or(true, |value| self.kind.accepts(value))
    }
}

/// No attribute outside `known` (plus the [`SBASE_ATTRIBUTES`]) may appear.
#[derive(Debug, Clone, Copy)]
pub struct KnownAttributes(pub &'static [&'static str]);

impl Predicate for KnownAttributes {
    fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.attributes()
            .keys()
            .all(|name| SBASE_ATTRIBUTES.contains(&name.as_str()) || self.0.contains(&name.as_str()))
    }
}

/// Level 3 attribute-group rule: every `required` attribute is set and no
/// unknown attribute appears.
#[must_use]
pub fn attribute_group(required: &'static [&'static str], known: &'static [&'static str]) -> AllOf {
    required
        .iter()
        .fold(AllOf::new(), |group, attr| group.and(Required(*attr)))
        .and(KnownAttributes(known))
}

/// The attribute, when present, must name an object of one of `targets`.
///
/// Level 3 widens some references (e.g. to species references); those extra
/// kinds are accepted only when the run's level is at least 3.
#[derive(Debug, Clone, Copy)]
pub struct RefersTo {
    attribute: &'static str,
    targets: &'static [ObjectKind],
    from_level_3: &'static [ObjectKind],
}

impl RefersTo {
    /// Creates the template.
    #[must_use]
    pub const fn new(attribute: &'static str, targets: &'static [ObjectKind]) -> Self {
        Self {
            attribute,
            targets,
            from_level_3: &[],
        }
    }

    /// Also accepts `extra` kinds at level 3 and above.
    #[must_use]
    pub const fn or_from_level_3(mut self, extra: &'static [ObjectKind]) -> Self {
        self.from_level_3 = extra;
        self
    }
}

impl Predicate for RefersTo {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        let Some(value) = obj.attribute(self.attribute) else {
            return true;
        };
        ctx.resolves_to(value, self.targets)
            || (ctx.level() >= 3 && ctx.resolves_to(value, self.from_level_3))
    }
}

/// Kinds a rule, initial assignment or event assignment may target.
pub const MODEL_VARIABLES: &[ObjectKind] = &[
    ObjectKind::Compartment,
    ObjectKind::Species,
    ObjectKind::Parameter,
];

/// Reference to a model variable; species references count at level 3.
#[must_use]
pub const fn refers_to_variable(attribute: &'static str) -> RefersTo {
    RefersTo::new(attribute, MODEL_VARIABLES).or_from_level_3(&[ObjectKind::SpeciesReference])
}

/// Returns the effective `constant` flag of a variable.
///
/// An absent flag defaults to `true` for level 1 and 2 compartments and
/// parameters and to `false` otherwise.
#[must_use]
pub fn is_constant(level: u32, node: &Node) -> bool {
    node.flag("constant").unwrap_or_else(|| {
        level < 3 && matches!(node.kind(), ObjectKind::Compartment | ObjectKind::Parameter)
    })
}

/// Returns true if an initial assignment or assignment rule of the model
/// sets the variable `id`.
#[must_use]
pub fn is_assigned(model: &Node, id: &str) -> bool {
    model
        .children_in("listOfInitialAssignments")
        .iter()
        .any(|ia| ia.attribute("symbol") == Some(id))
        || model
            .children_in("listOfRules")
            .iter()
            .any(|rule| {
                rule.kind() == ObjectKind::AssignmentRule && rule.attribute("variable") == Some(id)
            })
}

/// The object named by `attribute` must not be constant.
#[derive(Debug, Clone, Copy)]
pub struct TargetNotConstant(pub &'static str);

impl Predicate for TargetNotConstant {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.attribute(self.0)
            .and_then(|value| ctx.index().find(value))
            .map_or(true, |target| !is_constant(ctx.level(), target))
    }
}

/// The object must have a math child.
#[derive(Debug, Clone, Copy)]
pub struct MathSet;

impl Predicate for MathSet {
    fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.math().is_some()
    }
}

/// The math child, when present, must not be statically of the other type.
#[derive(Debug, Clone, Copy)]
pub struct MathYields(pub MathType);

impl MathYields {
    /// Math must be boolean.
    pub const BOOLEAN: Self = Self(MathType::Boolean);
    /// Math must be numeric.
    pub const NUMERIC: Self = Self(MathType::Numeric);
}

impl Predicate for MathYields {
    fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.math().map_or(true, |math| {
            let found = math.value_type();
            found == MathType::Unknown || found == self.0
        })
    }
}

/// The named list must exist and contain at least one item.
#[derive(Debug, Clone, Copy)]
pub struct HasItems(pub &'static str);

impl Predicate for HasItems {
    fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        !obj.children_in(self.0).is_empty()
    }
}

/// A `listOf*` container that is present must not be empty.
#[derive(Debug, Clone, Copy)]
pub struct NoEmptyLists;

impl Predicate for NoEmptyLists {
    fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        let node = obj.node();
        node.kind()
            .child_lists()
            .iter()
            .filter(|list| list.starts_with("listOf"))
            .all(|list| !node.has_list(list) || !node.children_in(list).is_empty())
    }
}

/// The attribute, when present, must be one of `values`.
#[derive(Debug, Clone, Copy)]
pub struct OneOf {
    attribute: &'static str,
    values: &'static [&'static str],
}

impl OneOf {
    /// Creates the template.
    #[must_use]
    pub const fn new(attribute: &'static str, values: &'static [&'static str]) -> Self {
        Self { attribute, values }
    }
}

impl Predicate for OneOf {
    fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        obj.attribute(self.attribute)
            .map_or(true, |value| self.values.contains(&value))
    }
}

/// Where a [`UniqueIn`] list lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A list of the model.
    Model,
    /// A list of the direct parent.
    Parent,
}

/// Within the scoped list, the first item carrying this object's value of
/// `attribute` must be the object itself.
#[derive(Debug, Clone, Copy)]
pub struct UniqueIn {
    scope: Scope,
    list: &'static str,
    attribute: &'static str,
}

impl UniqueIn {
    /// Creates the template.
    #[must_use]
    pub const fn new(scope: Scope, list: &'static str, attribute: &'static str) -> Self {
        Self {
            scope,
            list,
            attribute,
        }
    }
}

impl Predicate for UniqueIn {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        let Some(value) = obj.attribute(self.attribute) else {
            return true;
        };
        let container = match self.scope {
            Scope::Model => ctx.model(),
            Scope::Parent => obj.parent(),
        };
        container
            .and_then(|c| {
                c.children_in(self.list)
                    .iter()
                    .find(|item| item.attribute(self.attribute) == Some(value))
            })
            .map_or(true, |first| std::ptr::eq(first, obj.node()))
    }
}

/// Declares an SBO rule: a present `sboTerm` must be well formed.
///
/// `sboTerm` exists from level 2 version 2 on.
#[must_use]
pub fn sbo_rule(id: u32, summary: &'static str) -> RuleDecl {
    RuleDecl::new(
        id,
        Category::SboConsistency,
        summary,
        Parses::new("sboTerm", ValueKind::SboTerm),
    )
    .gate(Gate::LevelVersionAtLeast(2, 2))
    .detail("sboTerm")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::outcomes;
    use sbml_lint_core::{Document, Math};

    fn model(children: Vec<(&str, Node)>) -> Document {
        let model = children
            .into_iter()
            .fold(Node::new(ObjectKind::Model), |m, (list, child)| {
                m.with_child(list, child)
            });
        Document::new(3, 1, Some(model))
    }

    #[test]
    fn value_kinds() {
        assert!(ValueKind::Double.accepts("1e-3"));
        assert!(ValueKind::Double.accepts("INF"));
        assert!(!ValueKind::Double.accepts("one"));
        assert!(ValueKind::Integer.accepts("-2"));
        assert!(!ValueKind::Integer.accepts("1.5"));
        assert!(!ValueKind::NonNegativeInteger.accepts("-1"));
        assert!(ValueKind::Boolean.accepts("0"));
        assert!(!ValueKind::Boolean.accepts("yes"));
        assert!(ValueKind::SboTerm.accepts("SBO:0000001"));
    }

    #[test]
    fn attribute_group_requires_and_restricts() {
        let doc = model(vec![
            (
                "listOfParameters",
                Node::new(ObjectKind::Parameter)
                    .with_attr("id", "k")
                    .with_attr("constant", "true"),
            ),
            ("listOfParameters", Node::new(ObjectKind::Parameter).with_attr("id", "j")),
            (
                "listOfParameters",
                Node::new(ObjectKind::Parameter)
                    .with_attr("id", "q")
                    .with_attr("constant", "true")
                    .with_attr("colour", "red"),
            ),
        ]);
        let group = attribute_group(&["id", "constant"], &["value", "units", "constant"]);
        assert_eq!(
            outcomes(&doc, ObjectKind::Parameter, &group),
            vec![true, false, false]
        );
    }

    #[test]
    fn variable_reference_widens_at_level_3() {
        let reaction = Node::new(ObjectKind::Reaction)
            .with_attr("id", "r")
            .with_child("listOfProducts", Node::new(ObjectKind::SpeciesReference).with_attr("id", "sr"));
        let rule = Node::new(ObjectKind::AssignmentRule).with_attr("variable", "sr");
        let l3 = model(vec![("listOfReactions", reaction), ("listOfRules", rule)]);
        let pred = refers_to_variable("variable");
        assert_eq!(outcomes(&l3, ObjectKind::AssignmentRule, &pred), vec![true]);

        let l2 = Document::new(2, 4, l3.model().cloned());
        assert_eq!(outcomes(&l2, ObjectKind::AssignmentRule, &pred), vec![false]);
    }

    #[test]
    fn constant_defaults_depend_on_level() {
        let parameter = Node::new(ObjectKind::Parameter);
        assert!(is_constant(2, &parameter));
        assert!(!is_constant(3, &parameter));
        assert!(!is_constant(2, &Node::new(ObjectKind::Species)));
        assert!(!is_constant(2, &parameter.with_attr("constant", "false")));
    }

    #[test]
    fn math_yields_tolerates_unknown() {
        let doc = model(vec![
            (
                "listOfConstraints",
                Node::new(ObjectKind::Constraint).with_math(Math::apply("lt", vec![Math::ci("x"), Math::cn(1.0)])),
            ),
            ("listOfConstraints", Node::new(ObjectKind::Constraint).with_math(Math::ci("x"))),
            (
                "listOfConstraints",
                Node::new(ObjectKind::Constraint).with_math(Math::Call {
                    function: "f".to_string(),
                    args: vec![],
                }),
            ),
            ("listOfConstraints", Node::new(ObjectKind::Constraint)),
        ]);
        assert_eq!(
            outcomes(&doc, ObjectKind::Constraint, &MathYields::BOOLEAN),
            vec![true, false, true, true]
        );
        assert_eq!(
            outcomes(&doc, ObjectKind::Constraint, &MathSet),
            vec![true, true, true, false]
        );
    }

    #[test]
    fn empty_lists_are_flagged_only_when_present() {
        let doc = Document::new(3, 1, Some(Node::new(ObjectKind::Model)));
        assert_eq!(outcomes(&doc, ObjectKind::Model, &NoEmptyLists), vec![true]);

        let doc = Document::new(3, 1, Some(Node::new(ObjectKind::Model).with_list("listOfSpecies")));
        assert_eq!(outcomes(&doc, ObjectKind::Model, &NoEmptyLists), vec![false]);
    }

    #[test]
    fn unique_in_flags_later_duplicates() {
        let ia = |symbol: &str| Node::new(ObjectKind::InitialAssignment).with_attr("symbol", symbol);
        let doc = model(vec![
            ("listOfInitialAssignments", ia("x")),
            ("listOfInitialAssignments", ia("y")),
            ("listOfInitialAssignments", ia("x")),
        ]);
        let pred = UniqueIn::new(Scope::Model, "listOfInitialAssignments", "symbol");
        assert_eq!(
            outcomes(&doc, ObjectKind::InitialAssignment, &pred),
            vec![true, true, false]
        );
    }

    #[test]
    fn sbo_rule_is_gated() {
        let rule = sbo_rule(10701, "model sboTerm");
        assert_eq!(rule.category(), Category::SboConsistency);
        assert!(!rule.level_gate().admits(2, 1));
        assert!(rule.level_gate().admits(3, 1));
    }
}
