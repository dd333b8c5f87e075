//! Read-only context handed to predicates.

use crate::document::{Document, HasId, Node, ObjectKind};
use crate::types::PackageTag;
use std::collections::{BTreeMap, BTreeSet};

/// Context provided to every predicate evaluation.
///
/// Carries the effective level/version of the run (which may differ from the
/// document's own when the caller overrides it) and an identifier index
/// scoped to the run's active packages.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'r> {
    level: u32,
    version: u32,
    document: &'r Document,
    index: &'r IdIndex<'r>,
}

impl<'r> CheckContext<'r> {
    /// Creates a context.
    #[must_use]
    pub fn new(
        level: u32,
        version: u32,
        document: &'r Document,
        index: &'r IdIndex<'r>,
    ) -> Self {
        Self {
            level,
            version,
            document,
            index,
        }
    }

    /// Returns the effective SBML level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns the effective SBML version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the document under validation.
    #[must_use]
    pub fn document(&self) -> &'r Document {
        self.document
    }

    /// Returns the model, if any.
    #[must_use]
    pub fn model(&self) -> Option<&'r Node> {
        self.document.model()
    }

    /// Returns the identifier index.
    #[must_use]
    pub fn index(&self) -> &'r IdIndex<'r> {
        self.index
    }

    /// Returns true if `id` names an object of one of `kinds`.
    #[must_use]
    pub fn resolves_to(&self, id: &str, kinds: &[ObjectKind]) -> bool {
        self.index.resolves_to(id, kinds)
    }
}

/// Identifier lookup built once per run.
///
/// Covers the core tree and the sub-trees of the run's active packages;
/// extensions of inactive packages are not indexed. Unit definitions live
/// in their own namespace; local parameters are scoped to their kinetic law
/// and are not indexed.
#[derive(Debug, Default)]
pub struct IdIndex<'a> {
    ids: BTreeMap<&'a str, Vec<&'a Node>>,
    units: BTreeMap<&'a str, Vec<&'a Node>>,
}

impl<'a> IdIndex<'a> {
    /// Indexes every identified object of the document reachable through
    /// `packages`, in document order.
    #[must_use]
    pub fn build(document: &'a Document, packages: &BTreeSet<PackageTag>) -> Self {
        let mut index = Self::default();
        document.root().walk(packages, &mut |node| {
            let Some(id) = node.id() else {
                return;
            };
            match node.kind() {
                ObjectKind::UnitDefinition => index.units.entry(id).or_default().push(node),
                ObjectKind::LocalParameter => {}
                _ => index.ids.entry(id).or_default().push(node),
            }
        });
        index
    }

    /// Returns every object carrying `id` in the SId namespace.
    #[must_use]
    pub fn occurrences(&self, id: &str) -> &[&'a Node] {
        self.ids.get(id).map_or(&[], Vec::as_slice)
    }

    /// Returns the first object carrying `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&'a Node> {
        self.occurrences(id).first().copied()
    }

    /// Returns the kinds of the objects carrying `id`.
    pub fn kinds_of(&self, id: &str) -> impl Iterator<Item = ObjectKind> + '_ {
        self.occurrences(id).iter().map(|n| n.kind())
    }

    /// Returns true if some object carrying `id` has one of `kinds`.
    #[must_use]
    pub fn resolves_to(&self, id: &str, kinds: &[ObjectKind]) -> bool {
        self.kinds_of(id).any(|k| kinds.contains(&k))
    }

    /// Returns true if `node` is not the first carrier of its id.
    #[must_use]
    pub fn is_duplicate(&self, node: &Node) -> bool {
        let Some(id) = node.id() else {
            return false;
        };
        let table = if node.kind() == ObjectKind::UnitDefinition {
            &self.units
        } else {
            &self.ids
        };
        table
            .get(id)
            .and_then(|nodes| nodes.first())
            .is_some_and(|first| !std::ptr::eq(*first, node))
    }

    /// Returns the unit definition with the given id.
    #[must_use]
    pub fn unit_definition(&self, id: &str) -> Option<&'a Node> {
        self.units.get(id).and_then(|nodes| nodes.first()).copied()
    }

    /// Returns the number of distinct SIds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no identified object exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HasChildren;

    fn doc() -> Document {
        let model = Node::new(ObjectKind::Model)
            .with_attr("id", "m")
            .with_child(
                "listOfUnitDefinitions",
                Node::new(ObjectKind::UnitDefinition).with_attr("id", "k"),
            )
            .with_child(
                "listOfSpecies",
                Node::new(ObjectKind::Species).with_attr("id", "s1"),
            )
            .with_child(
                "listOfParameters",
                Node::new(ObjectKind::Parameter).with_attr("id", "k"),
            )
            .with_child(
                "listOfParameters",
                Node::new(ObjectKind::Parameter).with_attr("id", "s1"),
            )
            .with_extension(
                PackageTag::Qual,
                Node::new(ObjectKind::QualModelPlugin).with_child(
                    "listOfQualitativeSpecies",
                    Node::new(ObjectKind::QualitativeSpecies).with_attr("id", "q"),
                ),
            );
        Document::new(3, 1, Some(model))
    }

    fn active() -> BTreeSet<PackageTag> {
        BTreeSet::from([PackageTag::Qual])
    }

    #[test]
    fn unit_definitions_have_their_own_namespace() {
        let doc = doc();
        let index = IdIndex::build(&doc, &active());
        assert!(index.unit_definition("k").is_some());
        assert_eq!(
            index.kinds_of("k").collect::<Vec<_>>(),
            vec![ObjectKind::Parameter]
        );
    }

    #[test]
    fn second_carrier_is_duplicate() {
        let doc = doc();
        let index = IdIndex::build(&doc, &active());
        let model = doc.model().unwrap();
        let species = &model.children_in("listOfSpecies")[0];
        let shadow = &model.children_in("listOfParameters")[1];
        assert!(!index.is_duplicate(species));
        assert!(index.is_duplicate(shadow));
        assert!(index.resolves_to("s1", &[ObjectKind::Species]));
    }

    #[test]
    fn active_package_extensions_are_indexed() {
        let doc = doc();
        let index = IdIndex::build(&doc, &active());
        assert_eq!(index.find("q").map(Node::kind), Some(ObjectKind::QualitativeSpecies));
    }

    #[test]
    fn inactive_package_extensions_are_skipped() {
        let doc = doc();
        let index = IdIndex::build(&doc, &BTreeSet::new());
        assert!(index.find("q").is_none());
        assert!(index.resolves_to("s1", &[ObjectKind::Species]));

        let fbc_only = IdIndex::build(&doc, &BTreeSet::from([PackageTag::Fbc]));
        assert!(fbc_only.find("q").is_none());
    }
}
