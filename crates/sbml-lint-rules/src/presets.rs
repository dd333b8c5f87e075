//! Category presets for common configurations.

use sbml_lint_core::Category;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Named category selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Preset {
    /// Every category, modeling practice included.
    Strict,
    /// Every consistency category; modeling-practice advice is left out.
    Recommended,
    /// Structure only: general, identifier and MathML consistency.
    Structural,
}

/// Error returned when parsing an unknown preset name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset `{0}` (expected strict, recommended or structural)")]
pub struct UnknownPreset(String);

impl Preset {
    /// All presets, strictest first.
    pub const ALL: [Self; 3] = [Self::Strict, Self::Recommended, Self::Structural];

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Recommended => "recommended",
            Self::Structural => "structural",
        }
    }

    /// Returns the categories this preset enables.
    #[must_use]
    pub fn categories(self) -> BTreeSet<Category> {
        match self {
            Self::Strict => Category::ALL.into_iter().collect(),
            Self::Recommended => Category::ALL
                .into_iter()
                .filter(|c| *c != Category::ModelingPractice)
                .collect(),
            Self::Structural => [
                Category::GeneralConsistency,
                Category::IdentifierConsistency,
                Category::MathmlConsistency,
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}
