//! Utility functions for rule implementations.

pub mod syntax;
pub mod units;

// Re-export commonly used utilities for rule implementations
#[doc(inline)]
pub use syntax::{is_chemical_formula, is_sbo_term, is_sid, is_unit_sid};
#[doc(inline)]
pub use units::is_base_unit;
