//! JSON deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to the domain model via the loader.

use crate::document::math::Math;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Raw JSON representation of a document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDto {
    /// SBML level.
    pub level: u32,
    /// SBML version.
    pub version: u32,
    /// Declared package prefixes (e.g. `"qual"`).
    #[serde(default)]
    pub packages: Vec<String>,
    /// The model, if any.
    #[serde(default)]
    pub model: Option<NodeDto>,
}

/// Raw JSON representation of one element.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDto {
    /// Element name (e.g. `"species"`, `"qual:transition"`).
    pub element: String,
    /// Attribute values; scalars are stringified by the loader.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Math child.
    #[serde(default)]
    pub math: Option<Math>,
    /// Named child lists.
    #[serde(default)]
    pub children: BTreeMap<String, Vec<NodeDto>>,
    /// Package extension roots keyed by package prefix.
    #[serde(default)]
    pub extensions: BTreeMap<String, NodeDto>,
    /// Source line.
    #[serde(default)]
    pub line: Option<usize>,
    /// Source column.
    #[serde(default)]
    pub column: Option<usize>,
}
