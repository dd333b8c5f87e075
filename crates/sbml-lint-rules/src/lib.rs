//! # sbml-lint-rules
//!
//! The standard SBML consistency rule catalog for sbml-lint.
//!
//! Rules are declared per object type and registered in one
//! [`CatalogBuilder`]. Their numbering follows the published SBML rule ids.
//!
//! ## Rule Modules
//!
//! | Module | Ids | Covers |
//! |--------|-----|--------|
//! | `model` | 20201-20216, 10601, 10701 | Document and model structure |
//! | `definitions` | 203xx, 204xx, 10702 | Function and unit definitions |
//! | `compartment` | 205xx, 80501, 10712 | Compartments |
//! | `species` | 206xx, 80601, 10713 | Species |
//! | `parameter` | 207xx, 80701, 10703 | Parameters |
//! | `assignments` | 208xx-210xx, 105xx | Initial assignments, rules, constraints |
//! | `reaction` | 211xx, 81121 | Reactions and kinetic laws |
//! | `event` | 212xx, 1056x | Events |
//! | `identifiers` | 103xx | Identifier syntax, uniqueness, unit references |
//! | `mathml` | 102xx | MathML references and types |
//! | `qual` | 3000000-3999999 | Qualitative models package |
//! | `fbc` | 2000000-2999999 | Flux balance constraints package |
//!
//! ## Usage
//!
//! ```ignore
//! use sbml_lint_core::ValidationContext;
//! use sbml_lint_rules::{builtin_messages, standard_catalog};
//!
//! let mut context = ValidationContext::builder(standard_catalog()?, builtin_messages()?)
//!     .build()?;
//! let log = context.validate(&document)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assignments;
mod compartment;
mod definitions;
mod event;
mod fbc;
mod identifiers;
mod mathml;
mod model;
mod overdetermined;
mod parameter;
mod presets;
mod qual;
mod reaction;
mod species;

/// Parameterized predicates backing most rules.
pub mod templates;

/// Unit inference for the units-consistency rules.
pub mod units;

use sbml_lint_core::{Catalog, CatalogBuilder, CatalogError, MessageCatalog, MessageError};
use std::sync::{Arc, OnceLock};
use tracing::debug;

pub use identifiers::{UniqueId, UnitsResolve};
pub use mathml::{CallsResolve, IdentifiersResolve};
pub use overdetermined::Overdetermined;
pub use presets::{Preset, UnknownPreset};

/// Re-export core types for convenience.
pub use sbml_lint_core::{Category, RuleId, Severity};

const MESSAGES: &str = include_str!("messages.toml");

/// Returns a builder preloaded with the standard packages and rule groups.
///
/// Callers may add groups of their own before building.
#[must_use]
pub fn standard_builder() -> CatalogBuilder {
    Catalog::builder()
        .package(qual::package())
        .package(fbc::package())
        .groups(model::groups())
        .groups(definitions::groups())
        .groups(compartment::groups())
        .groups(species::groups())
        .groups(parameter::groups())
        .groups(assignments::groups())
        .groups(reaction::groups())
        .groups(event::groups())
        .groups(identifiers::groups())
        .groups(mathml::groups())
        .groups(qual::groups())
        .groups(fbc::groups())
}

/// Returns the standard catalog, built once per process.
///
/// # Errors
///
/// Returns the construction error if the declarations are inconsistent.
pub fn standard_catalog() -> Result<Arc<Catalog>, CatalogError> {
    static CATALOG: OnceLock<Result<Arc<Catalog>, CatalogError>> = OnceLock::new();
    CATALOG
        .get_or_init(|| {
            let catalog = standard_builder().build()?;
            debug!(rules = catalog.len(), "standard catalog built");
            Ok(Arc::new(catalog))
        })
        .clone()
}

/// Returns the built-in message templates, parsed once per process.
///
/// # Errors
///
/// Returns the parse error if the bundled resource is malformed.
pub fn builtin_messages() -> Result<Arc<MessageCatalog>, MessageError> {
    static MESSAGES_CATALOG: OnceLock<Result<Arc<MessageCatalog>, MessageError>> =
        OnceLock::new();
    MESSAGES_CATALOG
        .get_or_init(|| MessageCatalog::from_toml(MESSAGES).map(Arc::new))
        .clone()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{builtin_messages, standard_catalog};
    use sbml_lint_core::{
        CheckContext, Document, ErrorLog, HasChildren, HasExtensions, IdIndex, Node, ObjectKind,
        ObjectRef, PackageTag, Predicate, ValidationContext,
    };

    /// Validates with the standard catalog and default settings.
    pub(crate) fn run(document: &Document) -> ErrorLog {
        let catalog = standard_catalog().unwrap();
        let messages = builtin_messages().unwrap();
        let mut context = ValidationContext::builder(catalog, messages).build().unwrap();
        context.validate(document).unwrap().clone()
    }

    /// Raw ids of the logged diagnostics, in log order.
    pub(crate) fn failures(log: &ErrorLog) -> Vec<u32> {
        log.codes().into_iter().map(|id| id.get()).collect()
    }

    fn collect<'a>(
        node: &'a Node,
        ancestors: &mut Vec<&'a Node>,
        kind: ObjectKind,
        found: &mut Vec<(&'a Node, Vec<&'a Node>)>,
    ) {
        if node.kind() == kind {
            found.push((node, ancestors.clone()));
        }
        ancestors.push(node);
        for list in node.kind().child_lists() {
            for child in node.children_in(list) {
                collect(child, ancestors, kind, found);
            }
        }
        for tag in PackageTag::ALL {
            if let Some(extension) = node.extension(tag) {
                collect(extension, ancestors, kind, found);
            }
        }
        ancestors.pop();
    }

    /// Evaluates `predicate` on every object of `kind`, in document order.
    pub(crate) fn outcomes(
        document: &Document,
        kind: ObjectKind,
        predicate: &dyn Predicate,
    ) -> Vec<bool> {
        let index = IdIndex::build(document, document.packages());
        let ctx = CheckContext::new(document.level(), document.version(), document, &index);
        let mut found = Vec::new();
        collect(document.root(), &mut Vec::new(), kind, &mut found);
        found
            .iter()
            .map(|(node, ancestors)| predicate.holds(&ctx, ObjectRef::new(node, ancestors, document)))
            .collect()
    }
}
