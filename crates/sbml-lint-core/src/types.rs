//! Core identifier and classification types shared by the catalog and the log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric identifier of one consistency rule.
///
/// Identifiers are globally unique and partitioned into contiguous ranges:
/// core rules use five-digit codes, optional packages reserve their own
/// million-wide range (see [`crate::PackageDecl`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(u32);

impl RuleId {
    /// Internal marker: recurse into the declared children of the current node.
    pub const RECURSE_TREE: Self = Self(0);

    /// Internal marker: validate attached package sub-trees as a group.
    pub const VALIDATE_GROUP: Self = Self(1);

    /// Creates a rule identifier from its numeric code.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true for the two recursion markers, which never surface as diagnostics.
    #[must_use]
    pub const fn is_sentinel(self) -> bool {
        self.0 == Self::RECURSE_TREE.0 || self.0 == Self::VALIDATE_GROUP.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RuleId {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| UnknownName::new("rule id", s))
    }
}

impl From<u32> for RuleId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Error returned when parsing one of the enumerated names fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} `{value}`")]
pub struct UnknownName {
    what: &'static str,
    value: String,
}

impl UnknownName {
    fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Grouping of rules by concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Structural and semantic consistency of the core model.
    GeneralConsistency,
    /// Identifier syntax, uniqueness and reference resolution.
    IdentifierConsistency,
    /// Well-formedness and typing of mathematical expressions.
    MathmlConsistency,
    /// Recommendations that are not strictly required.
    ModelingPractice,
    /// Structural over-determination of the system of equations.
    OverdeterminedModel,
    /// Systems Biology Ontology term usage.
    SboConsistency,
    /// Agreement of declared and inferred units.
    UnitsConsistency,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::GeneralConsistency,
        Self::IdentifierConsistency,
        Self::MathmlConsistency,
        Self::ModelingPractice,
        Self::OverdeterminedModel,
        Self::SboConsistency,
        Self::UnitsConsistency,
    ];

    /// Returns the kebab-case name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GeneralConsistency => "general-consistency",
            Self::IdentifierConsistency => "identifier-consistency",
            Self::MathmlConsistency => "mathml-consistency",
            Self::ModelingPractice => "modeling-practice",
            Self::OverdeterminedModel => "overdetermined-model",
            Self::SboConsistency => "sbo-consistency",
            Self::UnitsConsistency => "units-consistency",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| UnknownName::new("category", s))
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// The document is invalid.
    Error,
    /// The document cannot be interpreted at all.
    Fatal,
}

impl Severity {
    /// All severities, least severe first.
    pub const ALL: [Self; 4] = [Self::Info, Self::Warning, Self::Error, Self::Fatal];

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str() == needle)
            .ok_or_else(|| UnknownName::new("severity", s))
    }
}

/// Identifier of an optional extension package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageTag {
    /// Qualitative models (logical regulatory networks).
    Qual,
    /// Flux balance constraints.
    Fbc,
}

impl PackageTag {
    /// All known packages.
    pub const ALL: [Self; 2] = [Self::Qual, Self::Fbc];

    /// Returns the namespace prefix used for the package.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qual => "qual",
            Self::Fbc => "fbc",
        }
    }

    /// Returns the XML namespace URI of the supported package version.
    #[must_use]
    pub const fn namespace_uri(self) -> &'static str {
        match self {
            Self::Qual => "http://www.sbml.org/sbml/level3/version1/qual/version1",
            Self::Fbc => "http://www.sbml.org/sbml/level3/version1/fbc/version2",
        }
    }
}

impl fmt::Display for PackageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageTag {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| UnknownName::new("package", s))
    }
}

/// Position of an element in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Returns true if `(level, version)` names a published SBML specification.
#[must_use]
pub const fn is_supported_level_version(level: u32, version: u32) -> bool {
    matches!((level, version), (1, 1..=2) | (2, 1..=5) | (3, 1..=2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_recognised() {
        assert!(RuleId::RECURSE_TREE.is_sentinel());
        assert!(RuleId::VALIDATE_GROUP.is_sentinel());
        assert!(!RuleId::new(21211).is_sentinel());
    }

    #[test]
    fn rule_id_parses_decimal() {
        assert_eq!("21211".parse::<RuleId>(), Ok(RuleId::new(21211)));
        assert!("abc".parse::<RuleId>().is_err());
    }

    #[test]
    fn category_round_trips_through_name() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        let err = "units".parse::<Category>().unwrap_err();
        assert_eq!(err.value(), "units");
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Fatal > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn package_parses() {
        assert_eq!("qual".parse::<PackageTag>(), Ok(PackageTag::Qual));
        assert_eq!(" fbc ".parse::<PackageTag>(), Ok(PackageTag::Fbc));
        assert!("layout".parse::<PackageTag>().is_err());
    }

    #[test]
    fn level_version_table() {
        assert!(is_supported_level_version(2, 4));
        assert!(is_supported_level_version(3, 2));
        assert!(!is_supported_level_version(3, 3));
        assert!(!is_supported_level_version(4, 1));
        assert!(!is_supported_level_version(1, 3));
    }
}
