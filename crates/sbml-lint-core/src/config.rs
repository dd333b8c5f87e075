//! Configuration types for sbml-lint.

use crate::types::{is_supported_level_version, Category, PackageTag, RuleId, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration, usually read from `sbml-lint.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Run-level settings.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Per-rule settings keyed by decimal rule id.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// Rule keys and the level/version/package combination are checked here,
    /// so a bad file never reaches a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or the settings are inconsistent.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.rule_overrides()?;
        config.validation.check()?;
        Ok(config)
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, id: RuleId) -> bool {
        self.rule_config(id).map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, id: RuleId) -> Option<Severity> {
        self.rule_config(id).and_then(|c| c.severity)
    }

    // Keys are matched by value, so "010201" and "10201" name the same rule.
    fn rule_config(&self, id: RuleId) -> Option<&RuleConfig> {
        self.rules
            .iter()
            .find(|(key, _)| key.parse::<RuleId>().ok() == Some(id))
            .map(|(_, rule)| rule)
    }

    /// Returns the per-rule settings with parsed ids.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRuleKey`] for a key that is not a decimal id.
    pub fn rule_overrides(&self) -> Result<Vec<(RuleId, &RuleConfig)>, ConfigError> {
        self.rules
            .iter()
            .map(|(key, rule)| {
                key.parse::<RuleId>()
                    .map(|id| (id, rule))
                    .map_err(|_| ConfigError::InvalidRuleKey { key: key.clone() })
            })
            .collect()
    }
}

/// The `[validation]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// SBML level to validate against (default: the document's).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,

    /// SBML version to validate against (default: the document's).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Active categories (default: all).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,

    /// Active packages (default: those the document declares).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<PackageTag>>,
}

impl ValidationConfig {
    /// Checks the settings that can be judged without a document.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn check(&self) -> Result<(), ConfigError> {
        if let (Some(level), Some(version)) = (self.level, self.version) {
            if !is_supported_level_version(level, version) {
                return Err(ConfigError::UnsupportedLevelVersion { level, version });
            }
        }
        if self.categories.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::NoCategories);
        }
        if let (Some(level), Some(packages)) = (self.level, &self.packages) {
            if let Some(package) = packages.first() {
                if level < 3 {
                    return Err(ConfigError::PackageRequiresLevel3 {
                        package: *package,
                        level,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Configuration errors. All of them are raised before traversal starts.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(sbml_lint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(sbml_lint::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A `[rules.<key>]` table whose key is not a rule id.
    #[error("`{key}` is not a rule id")]
    #[diagnostic(
        code(sbml_lint::config::rule_key),
        help("rule tables are keyed by decimal id, e.g. [rules.21211]")
    )]
    InvalidRuleKey {
        /// The rejected key.
        key: String,
    },

    /// A rule id the catalog does not declare.
    #[error("rule {id} is not in the catalog")]
    #[diagnostic(
        code(sbml_lint::config::unknown_rule),
        help("run `sbml-lint list-rules` to see the available ids")
    )]
    UnknownRule {
        /// The unknown id.
        id: RuleId,
    },

    /// A (level, version) pair that names no published specification.
    #[error("SBML level {level} version {version} does not exist")]
    #[diagnostic(
        code(sbml_lint::config::level_version),
        help("supported: L1V1-2, L2V1-5, L3V1-2")
    )]
    UnsupportedLevelVersion {
        /// Requested level.
        level: u32,
        /// Requested version.
        version: u32,
    },

    /// A package requested below level 3.
    #[error("package `{package}` requires level 3, got level {level}")]
    #[diagnostic(code(sbml_lint::config::package_level))]
    PackageRequiresLevel3 {
        /// Requested package.
        package: PackageTag,
        /// Effective level.
        level: u32,
    },

    /// An empty category set.
    #[error("at least one category must be active")]
    #[diagnostic(code(sbml_lint::config::no_categories))]
    NoCategories,
}
