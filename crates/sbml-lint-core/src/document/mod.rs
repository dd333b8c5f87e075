//! The document tree the engine validates, and its JSON loader.
//!
//! # Architecture
//!
//! ```text
//! JSON text
//!   ↓ serde (DTO layer)
//! dto types
//!   ↓ validate + convert
//! Document (read-only domain tree)
//! ```
//!
//! XML reading is out of scope; upstream readers produce the same tree.

pub mod dto;
pub mod loader;
pub mod math;
pub mod model;

pub use loader::{from_json, LoadError};
pub use math::{Math, MathType};
pub use model::{
    Document, HasAttributes, HasChildren, HasExtensions, HasId, HasMath, Node, ObjectKind,
    ObjectRef,
};

impl Document {
    /// Parses a document from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names unknown elements or packages.
    pub fn from_json(content: &str) -> Result<Self, LoadError> {
        loader::from_json(content)
    }
}
