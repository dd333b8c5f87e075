//! # sbml-lint-core
//!
//! Consistency-validation engine for SBML documents.
//!
//! This crate provides the foundational types for checking a document tree
//! against a catalog of numbered rules. It includes:
//!
//! - [`Document`], [`Node`] and the capability traits predicates read through
//! - [`Predicate`] and [`RuleDecl`] for declaring rules
//! - [`Catalog`] for registering declarations and resolving applicable rules
//! - [`ValidationContext`] for running a validation pass
//! - [`Diagnostic`] and [`ErrorLog`] for the results
//!
//! ## Example
//!
//! ```ignore
//! use sbml_lint_core::{Catalog, DeclarationGroup, MessageCatalog, ObjectKind, RuleDecl,
//!     ValidationContext, Category};
//! use std::sync::Arc;
//!
//! let catalog = Catalog::builder()
//!     .group(DeclarationGroup::core(ObjectKind::Species).rule(
//!         RuleDecl::check(20601, Category::GeneralConsistency, "species has a compartment",
//!             |_, obj| obj.is_set("compartment")),
//!     ))
//!     .build()?;
//!
//! let mut context = ValidationContext::builder(Arc::new(catalog), Arc::new(MessageCatalog::new()))
//!     .build()?;
//! let log = context.validate(&document)?;
//! log.print(&mut std::io::stdout())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod context;
mod log;
mod messages;
mod rule;
mod types;
mod validator;

/// Document tree consumed by the engine.
pub mod document;

/// Utility modules for rule implementations.
pub mod utils;

pub use catalog::{
    Catalog, CatalogBuilder, CatalogError, DeclarationGroup, PackageDecl, Selection, Target,
};
pub use config::{Config, ConfigError, RuleConfig, ValidationConfig};
pub use context::{CheckContext, IdIndex};
pub use document::{
    Document, HasAttributes, HasChildren, HasExtensions, HasId, HasMath, LoadError, Math,
    MathType, Node, ObjectKind, ObjectRef,
};
pub use log::{Diagnostic, DiagnosticKind, ErrorLog};
pub use messages::{MessageCatalog, MessageError, MessageTemplate, RenderError, Synthesizer};
pub use rule::{predicate, AllOf, Gate, Predicate, PredicateBox, RuleDecl, RuleEvent};
pub use types::{
    is_supported_level_version, Category, Location, PackageTag, RuleId, Severity, UnknownName,
};
pub use validator::{RunState, RunStats, ValidationContext, ValidationContextBuilder};
