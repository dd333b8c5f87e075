//! Read-only document tree consumed by the validation engine.
//!
//! The tree is deliberately generic: every element is a [`Node`] tagged with
//! its [`ObjectKind`], raw string attributes, optional math, named child
//! lists and per-package extension roots. Predicates access it through the
//! capability traits ([`HasId`], [`HasAttributes`], [`HasMath`],
//! [`HasChildren`], [`HasExtensions`]) rather than concrete classes.

use crate::document::math::Math;
use crate::types::{Location, PackageTag};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Concrete type tag of a document object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// The `<sbml>` document root.
    #[serde(rename = "sbml")]
    Document,
    /// `<model>`
    #[serde(rename = "model")]
    Model,
    /// `<functionDefinition>`
    #[serde(rename = "functionDefinition")]
    FunctionDefinition,
    /// `<unitDefinition>`
    #[serde(rename = "unitDefinition")]
    UnitDefinition,
    /// `<unit>`
    #[serde(rename = "unit")]
    Unit,
    /// `<compartment>`
    #[serde(rename = "compartment")]
    Compartment,
    /// `<species>`
    #[serde(rename = "species")]
    Species,
    /// `<parameter>`
    #[serde(rename = "parameter")]
    Parameter,
    /// `<initialAssignment>`
    #[serde(rename = "initialAssignment")]
    InitialAssignment,
    /// `<assignmentRule>`
    #[serde(rename = "assignmentRule")]
    AssignmentRule,
    /// `<rateRule>`
    #[serde(rename = "rateRule")]
    RateRule,
    /// `<algebraicRule>`
    #[serde(rename = "algebraicRule")]
    AlgebraicRule,
    /// `<constraint>`
    #[serde(rename = "constraint")]
    Constraint,
    /// `<reaction>`
    #[serde(rename = "reaction")]
    Reaction,
    /// `<speciesReference>`
    #[serde(rename = "speciesReference")]
    SpeciesReference,
    /// `<modifierSpeciesReference>`
    #[serde(rename = "modifierSpeciesReference")]
    ModifierSpeciesReference,
    /// `<kineticLaw>`
    #[serde(rename = "kineticLaw")]
    KineticLaw,
    /// `<localParameter>`
    #[serde(rename = "localParameter")]
    LocalParameter,
    /// `<event>`
    #[serde(rename = "event")]
    Event,
    /// `<trigger>`
    #[serde(rename = "trigger")]
    Trigger,
    /// `<delay>`
    #[serde(rename = "delay")]
    Delay,
    /// `<priority>`
    #[serde(rename = "priority")]
    Priority,
    /// `<eventAssignment>`
    #[serde(rename = "eventAssignment")]
    EventAssignment,
    /// Root of the qual extension attached to a model.
    #[serde(rename = "qual:model")]
    QualModelPlugin,
    /// `<qual:qualitativeSpecies>`
    #[serde(rename = "qual:qualitativeSpecies")]
    QualitativeSpecies,
    /// `<qual:transition>`
    #[serde(rename = "qual:transition")]
    Transition,
    /// `<qual:input>`
    #[serde(rename = "qual:input")]
    Input,
    /// `<qual:output>`
    #[serde(rename = "qual:output")]
    Output,
    /// `<qual:functionTerm>`
    #[serde(rename = "qual:functionTerm")]
    FunctionTerm,
    /// `<qual:defaultTerm>`
    #[serde(rename = "qual:defaultTerm")]
    DefaultTerm,
    /// Root of the fbc extension attached to a model.
    #[serde(rename = "fbc:model")]
    FbcModelPlugin,
    /// fbc attributes attached to a species.
    #[serde(rename = "fbc:species")]
    FbcSpeciesPlugin,
    /// fbc attributes attached to a reaction.
    #[serde(rename = "fbc:reaction")]
    FbcReactionPlugin,
    /// `<fbc:objective>`
    #[serde(rename = "fbc:objective")]
    Objective,
    /// `<fbc:fluxObjective>`
    #[serde(rename = "fbc:fluxObjective")]
    FluxObjective,
    /// `<fbc:geneProduct>`
    #[serde(rename = "fbc:geneProduct")]
    GeneProduct,
}

impl ObjectKind {
    /// Every kind, core kinds first.
    pub const ALL: [Self; 36] = [
        Self::Document,
        Self::Model,
        Self::FunctionDefinition,
        Self::UnitDefinition,
        Self::Unit,
        Self::Compartment,
        Self::Species,
        Self::Parameter,
        Self::InitialAssignment,
        Self::AssignmentRule,
        Self::RateRule,
        Self::AlgebraicRule,
        Self::Constraint,
        Self::Reaction,
        Self::SpeciesReference,
        Self::ModifierSpeciesReference,
        Self::KineticLaw,
        Self::LocalParameter,
        Self::Event,
        Self::Trigger,
        Self::Delay,
        Self::Priority,
        Self::EventAssignment,
        Self::QualModelPlugin,
        Self::QualitativeSpecies,
        Self::Transition,
        Self::Input,
        Self::Output,
        Self::FunctionTerm,
        Self::DefaultTerm,
        Self::FbcModelPlugin,
        Self::FbcSpeciesPlugin,
        Self::FbcReactionPlugin,
        Self::Objective,
        Self::FluxObjective,
        Self::GeneProduct,
    ];

    /// Returns the XML element name (package kinds carry their prefix).
    #[must_use]
    pub const fn element_name(self) -> &'static str {
        match self {
            Self::Document => "sbml",
            Self::Model => "model",
            Self::FunctionDefinition => "functionDefinition",
            Self::UnitDefinition => "unitDefinition",
            Self::Unit => "unit",
            Self::Compartment => "compartment",
            Self::Species => "species",
            Self::Parameter => "parameter",
            Self::InitialAssignment => "initialAssignment",
            Self::AssignmentRule => "assignmentRule",
            Self::RateRule => "rateRule",
            Self::AlgebraicRule => "algebraicRule",
            Self::Constraint => "constraint",
            Self::Reaction => "reaction",
            Self::SpeciesReference => "speciesReference",
            Self::ModifierSpeciesReference => "modifierSpeciesReference",
            Self::KineticLaw => "kineticLaw",
            Self::LocalParameter => "localParameter",
            Self::Event => "event",
            Self::Trigger => "trigger",
            Self::Delay => "delay",
            Self::Priority => "priority",
            Self::EventAssignment => "eventAssignment",
            Self::QualModelPlugin => "qual:model",
            Self::QualitativeSpecies => "qual:qualitativeSpecies",
            Self::Transition => "qual:transition",
            Self::Input => "qual:input",
            Self::Output => "qual:output",
            Self::FunctionTerm => "qual:functionTerm",
            Self::DefaultTerm => "qual:defaultTerm",
            Self::FbcModelPlugin => "fbc:model",
            Self::FbcSpeciesPlugin => "fbc:species",
            Self::FbcReactionPlugin => "fbc:reaction",
            Self::Objective => "fbc:objective",
            Self::FluxObjective => "fbc:fluxObjective",
            Self::GeneProduct => "fbc:geneProduct",
        }
    }

    /// Looks a kind up by its element name.
    #[must_use]
    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.element_name() == name)
    }

    /// Returns the package that defines this kind, or `None` for core kinds.
    #[must_use]
    pub const fn package(self) -> Option<PackageTag> {
        match self {
            Self::QualModelPlugin
            | Self::QualitativeSpecies
            | Self::Transition
            | Self::Input
            | Self::Output
            | Self::FunctionTerm
            | Self::DefaultTerm => Some(PackageTag::Qual),
            Self::FbcModelPlugin
            | Self::FbcSpeciesPlugin
            | Self::FbcReactionPlugin
            | Self::Objective
            | Self::FluxObjective
            | Self::GeneProduct => Some(PackageTag::Fbc),
            _ => None,
        }
    }

    /// Returns the names of the declared containment edges, in document order.
    ///
    /// Only these lists are traversed; anything else hanging off a node is
    /// invisible to the engine.
    #[must_use]
    pub const fn child_lists(self) -> &'static [&'static str] {
        match self {
            Self::Document => &["model"],
            Self::Model => &[
                "listOfFunctionDefinitions",
                "listOfUnitDefinitions",
                "listOfCompartments",
                "listOfSpecies",
                "listOfParameters",
                "listOfInitialAssignments",
                "listOfRules",
                "listOfConstraints",
                "listOfReactions",
                "listOfEvents",
            ],
            Self::UnitDefinition => &["listOfUnits"],
            Self::Reaction => &[
                "listOfReactants",
                "listOfProducts",
                "listOfModifiers",
                "kineticLaw",
            ],
            Self::KineticLaw => &["listOfLocalParameters"],
            Self::Event => &["trigger", "priority", "delay", "listOfEventAssignments"],
            Self::QualModelPlugin => &["listOfQualitativeSpecies", "listOfTransitions"],
            Self::Transition => &["listOfInputs", "listOfOutputs", "listOfFunctionTerms"],
            Self::FbcModelPlugin => &["listOfObjectives", "listOfGeneProducts"],
            Self::Objective => &["listOfFluxObjectives"],
            _ => &[],
        }
    }

    /// Returns true for the assignment, rate and algebraic rule kinds.
    #[must_use]
    pub const fn is_rule(self) -> bool {
        matches!(
            self,
            Self::AssignmentRule | Self::RateRule | Self::AlgebraicRule
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: ObjectKind,
    attributes: BTreeMap<String, String>,
    math: Option<Math>,
    children: BTreeMap<String, Vec<Node>>,
    extensions: BTreeMap<PackageTag, Node>,
    location: Option<Location>,
}

impl Node {
    /// Creates an empty node of the given kind.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            math: None,
            children: BTreeMap::new(),
            extensions: BTreeMap::new(),
            location: None,
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets the math child.
    #[must_use]
    pub fn with_math(mut self, math: Math) -> Self {
        self.math = Some(math);
        self
    }

    /// Appends a child to the named list.
    #[must_use]
    pub fn with_child(mut self, list: impl Into<String>, child: Node) -> Self {
        self.children.entry(list.into()).or_default().push(child);
        self
    }

    /// Ensures the named list exists, even if it stays empty.
    #[must_use]
    pub fn with_list(mut self, list: impl Into<String>) -> Self {
        self.children.entry(list.into()).or_default();
        self
    }

    /// Attaches the root of a package extension.
    #[must_use]
    pub fn with_extension(mut self, package: PackageTag, root: Node) -> Self {
        self.extensions.insert(package, root);
        self
    }

    /// Records the source position.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.location = Some(Location::new(line, column));
        self
    }

    /// Returns the concrete type tag.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Returns the source position, if known.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Returns true if the named list element is present (possibly empty).
    #[must_use]
    pub fn has_list(&self, list: &str) -> bool {
        self.children.contains_key(list)
    }

    /// Iterates over the names of the child lists that are present.
    pub fn list_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Visits this node and every node reachable through declared containment
    /// edges and the extensions of `packages`, pre-order.
    pub fn walk<'a>(
        &'a self,
        packages: &BTreeSet<PackageTag>,
        visit: &mut dyn FnMut(&'a Node),
    ) {
        visit(self);
        for list in self.kind.child_lists() {
            for child in self.children_in(list) {
                child.walk(packages, visit);
            }
        }
        for (tag, ext) in &self.extensions {
            if packages.contains(tag) {
                ext.walk(packages, visit);
            }
        }
    }
}

/// Read access to raw attributes.
pub trait HasAttributes {
    /// Returns all attributes.
    fn attributes(&self) -> &BTreeMap<String, String>;

    /// Returns one attribute value.
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes().get(name).map(String::as_str)
    }

    /// Returns true if the attribute is present.
    fn is_set(&self, name: &str) -> bool {
        self.attributes().contains_key(name)
    }

    /// Parses an XML boolean attribute (`true`, `false`, `1`, `0`).
    fn flag(&self, name: &str) -> Option<bool> {
        match self.attribute(name)?.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// Parses a numeric attribute.
    fn number(&self, name: &str) -> Option<f64> {
        self.attribute(name)?.trim().parse().ok()
    }
}

/// Objects identified by an `id` attribute.
pub trait HasId: HasAttributes {
    /// Returns the `id` attribute.
    fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Returns the `name` attribute.
    fn name(&self) -> Option<&str> {
        self.attribute("name")
    }
}

/// Objects that may carry a math child.
pub trait HasMath {
    /// Returns the math child, if set.
    fn math(&self) -> Option<&Math>;
}

/// Objects with named child lists.
pub trait HasChildren {
    /// Returns the items of a named list (empty if the list is absent).
    fn children_in(&self, list: &str) -> &[Node];

    /// Returns the first item of a named list.
    fn first_child(&self, list: &str) -> Option<&Node> {
        self.children_in(list).first()
    }
}

/// Objects that may carry package extension data.
pub trait HasExtensions {
    /// Returns the root of the package's private sub-tree for this object.
    fn extension(&self, package: PackageTag) -> Option<&Node>;
}

impl HasAttributes for Node {
    fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

impl HasId for Node {}

impl HasMath for Node {
    fn math(&self) -> Option<&Math> {
        self.math.as_ref()
    }
}

impl HasChildren for Node {
    fn children_in(&self, list: &str) -> &[Node] {
        self.children.get(list).map_or(&[], Vec::as_slice)
    }
}

impl HasExtensions for Node {
    fn extension(&self, package: PackageTag) -> Option<&Node> {
        self.extensions.get(&package)
    }
}

/// A parsed SBML document: level, version, declared packages and the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    level: u32,
    version: u32,
    packages: BTreeSet<PackageTag>,
    root: Node,
}

impl Document {
    /// Creates a document with an optional model.
    #[must_use]
    pub fn new(level: u32, version: u32, model: Option<Node>) -> Self {
        let mut root = Node::new(ObjectKind::Document);
        if let Some(model) = model {
            root = root.with_child("model", model);
        }
        Self {
            level,
            version,
            packages: BTreeSet::new(),
            root,
        }
    }

    /// Creates a document from an already-built root node.
    #[must_use]
    pub fn from_root(level: u32, version: u32, root: Node) -> Self {
        Self {
            level,
            version,
            packages: BTreeSet::new(),
            root,
        }
    }

    /// Declares a package namespace on the document.
    #[must_use]
    pub fn with_package(mut self, package: PackageTag) -> Self {
        self.packages.insert(package);
        self
    }

    /// Returns the SBML level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns the SBML version within the level.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the packages whose namespaces the document declares.
    #[must_use]
    pub fn packages(&self) -> &BTreeSet<PackageTag> {
        &self.packages
    }

    /// Returns true if the document declares the package namespace.
    #[must_use]
    pub fn declares(&self, package: PackageTag) -> bool {
        self.packages.contains(&package)
    }

    /// Returns the `<sbml>` root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns the model, if present.
    #[must_use]
    pub fn model(&self) -> Option<&Node> {
        self.root.first_child("model")
    }
}

/// Borrowed handle to one object of the tree during a rule evaluation.
///
/// Besides the node itself it carries the chain of ancestors (root first) so
/// that predicates can reach enclosing objects, e.g. the reaction owning a
/// kinetic law.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRef<'a> {
    node: &'a Node,
    ancestors: &'a [&'a Node],
    document: &'a Document,
}

impl<'a> ObjectRef<'a> {
    /// Creates a handle.
    #[must_use]
    pub fn new(node: &'a Node, ancestors: &'a [&'a Node], document: &'a Document) -> Self {
        Self {
            node,
            ancestors,
            document,
        }
    }

    /// Returns the referenced node.
    #[must_use]
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Returns the node's type tag.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.node.kind()
    }

    /// Returns the owning document.
    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Returns the direct parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&'a Node> {
        self.ancestors.last().copied()
    }

    /// Returns the nearest ancestor of the given kind.
    #[must_use]
    pub fn ancestor(&self, kind: ObjectKind) -> Option<&'a Node> {
        self.ancestors.iter().rev().find(|n| n.kind() == kind).copied()
    }

    /// Returns the enclosing model.
    #[must_use]
    pub fn model(&self) -> Option<&'a Node> {
        self.document.model()
    }

    /// Returns the element name and id used in rendered messages.
    #[must_use]
    pub fn describe(&self) -> (&'static str, &'a str) {
        (
            self.node.kind().element_name(),
            self.node.id().unwrap_or("(unnamed)"),
        )
    }
}

impl HasAttributes for ObjectRef<'_> {
    fn attributes(&self) -> &BTreeMap<String, String> {
        self.node.attributes()
    }
}

impl HasId for ObjectRef<'_> {}

impl HasMath for ObjectRef<'_> {
    fn math(&self) -> Option<&Math> {
        self.node.math()
    }
}

impl HasChildren for ObjectRef<'_> {
    fn children_in(&self, list: &str) -> &[Node] {
        self.node.children_in(list)
    }
}

impl HasExtensions for ObjectRef<'_> {
    fn extension(&self, package: PackageTag) -> Option<&Node> {
        self.node.extension(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> Node {
        Node::new(ObjectKind::Model)
            .with_attr("id", "m")
            .with_child(
                "listOfCompartments",
                Node::new(ObjectKind::Compartment).with_attr("id", "cell"),
            )
            .with_child(
                "listOfReactions",
                Node::new(ObjectKind::Reaction)
                    .with_attr("id", "r1")
                    .with_child("kineticLaw", Node::new(ObjectKind::KineticLaw)),
            )
    }

    #[test]
    fn element_names_round_trip() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::from_element_name(kind.element_name()), Some(kind));
        }
        assert_eq!(ObjectKind::from_element_name("layout:layout"), None);
    }

    #[test]
    fn package_kinds_are_tagged() {
        assert_eq!(ObjectKind::Output.package(), Some(PackageTag::Qual));
        assert_eq!(ObjectKind::GeneProduct.package(), Some(PackageTag::Fbc));
        assert_eq!(ObjectKind::EventAssignment.package(), None);
    }

    #[test]
    fn flags_parse_xml_booleans() {
        let node = Node::new(ObjectKind::Parameter)
            .with_attr("constant", "1")
            .with_attr("broken", "yes");
        assert_eq!(node.flag("constant"), Some(true));
        assert_eq!(node.flag("broken"), None);
        assert_eq!(node.flag("missing"), None);
    }

    #[test]
    fn walk_follows_declared_lists_only() {
        let model = sample_model().with_child("listOfLayouts", Node::new(ObjectKind::Parameter));
        let mut kinds = Vec::new();
        model.walk(&PackageTag::ALL.into_iter().collect(), &mut |n| kinds.push(n.kind()));
        assert_eq!(
            kinds,
            vec![
                ObjectKind::Model,
                ObjectKind::Compartment,
                ObjectKind::Reaction,
                ObjectKind::KineticLaw
            ]
        );
    }

    #[test]
    fn object_ref_finds_ancestors() {
        let doc = Document::new(3, 2, Some(sample_model()));
        let model = doc.model().unwrap();
        let reaction = &model.children_in("listOfReactions")[0];
        let law = reaction.first_child("kineticLaw").unwrap();
        let ancestors = [doc.root(), model, reaction];
        let obj = ObjectRef::new(law, &ancestors, &doc);

        assert_eq!(obj.parent().and_then(HasId::id), Some("r1"));
        assert_eq!(
            obj.ancestor(ObjectKind::Model).map(Node::kind),
            Some(ObjectKind::Model)
        );
        assert_eq!(obj.describe(), ("kineticLaw", "(unnamed)"));
    }
}
