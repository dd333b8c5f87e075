//! # sbml-lint
//!
//! Consistency validation for SBML models against a catalog of numbered rules.
//!
//! This is the main facade crate that re-exports the engine and the standard
//! rule catalog.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sbml_lint::Document;
//!
//! let document = Document::from_json(&std::fs::read_to_string("model.json")?)?;
//! let log = sbml_lint::validate(&document)?;
//! for diagnostic in log.entries() {
//!     println!("{diagnostic}");
//! }
//! ```
//!
//! ## With Settings
//!
//! ```rust,ignore
//! use sbml_lint::{Config, rules::Preset};
//!
//! let mut config = Config::from_file("sbml-lint.toml".as_ref())?;
//! config.validation.categories = Some(Preset::Structural.categories().into_iter().collect());
//! let log = sbml_lint::validate_with(&document, &config)?;
//! ```
//!
//! ## In Tests
//!
//! ```rust,ignore
//! #[test]
//! fn curated_models_are_consistent() {
//!     sbml_lint::assert_consistent("models/curated.json");
//! }
//! ```

#![forbid(unsafe_code)]

pub use sbml_lint_core::*;

/// Built-in rules, templates and presets.
pub mod rules {
    pub use sbml_lint_rules::*;
}

use std::path::{Path, PathBuf};

/// Anything that stops a document from being validated.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ValidateError {
    /// The standard catalog failed to build.
    #[error(transparent)]
    #[diagnostic(code(sbml_lint::catalog))]
    Catalog(#[from] CatalogError),

    /// The bundled message templates failed to parse.
    #[error(transparent)]
    #[diagnostic(code(sbml_lint::messages))]
    Messages(#[from] MessageError),

    /// The settings are impossible for this document.
    #[error(transparent)]
    #[diagnostic(code(sbml_lint::config))]
    Config(#[from] ConfigError),

    /// The document could not be loaded.
    #[error(transparent)]
    #[diagnostic(code(sbml_lint::load))]
    Load(#[from] LoadError),

    /// The document file could not be read.
    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(sbml_lint::io))]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

fn standard_context(config: &Config) -> Result<ValidationContext, ValidateError> {
    let catalog = rules::standard_catalog()?;
    let messages = rules::builtin_messages()?;
    Ok(ValidationContext::builder(catalog, messages)
        .config(config)?
        .build()?)
}

/// Validates a document with the standard catalog and default settings.
///
/// # Errors
///
/// Returns an error if the document's level and version are not supported.
pub fn validate(document: &Document) -> Result<ErrorLog, ValidateError> {
    validate_with(document, &Config::new())
}

/// Validates a document with the standard catalog and the given settings.
///
/// # Errors
///
/// Returns an error if the settings name unknown rules or are impossible
/// for this document.
pub fn validate_with(document: &Document, config: &Config) -> Result<ErrorLog, ValidateError> {
    let mut context = standard_context(config)?;
    let log = context.validate(document)?;
    tracing::debug!(diagnostics = log.count(), "validation finished");
    Ok(log.clone())
}

/// Loads a JSON document from disk and validates it with default settings.
///
/// # Errors
///
/// Returns an error if the file cannot be read or loaded, or if validation
/// cannot start.
pub fn validate_file(path: impl AsRef<Path>) -> Result<ErrorLog, ValidateError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ValidateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = Document::from_json(&content)?;
    validate(&document)
}

/// Validates a document file and panics with the report if it has errors.
///
/// Intended for `cargo test` suites that guard a set of curated models.
/// Relative paths are resolved against `CARGO_MANIFEST_DIR` when set.
///
/// # Panics
///
/// Panics if the document cannot be validated or has error or fatal
/// diagnostics.
pub fn assert_consistent(path: impl AsRef<Path>) {
    let path = resolve_test_path(path.as_ref());
    let log = validate_file(&path).unwrap_or_else(|e| {
        panic!("sbml-lint: cannot validate {}: {e}", path.display());
    });
    if log.has_errors() {
        panic!(
            "sbml-lint: {} is not consistent\n{}",
            path.display(),
            log.format_report()
        );
    }
}

fn resolve_test_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::var_os("CARGO_MANIFEST_DIR")
        .map_or_else(|| path.to_path_buf(), |dir| PathBuf::from(dir).join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_is_an_error_diagnostic() {
        let log = validate(&Document::new(3, 1, None)).unwrap();
        assert_eq!(log.codes(), vec![RuleId::new(20201)]);
        assert!(log.has_errors());
    }

    #[test]
    fn unsupported_level_is_refused() {
        let err = validate(&Document::new(4, 1, None)).unwrap_err();
        assert!(matches!(
            err,
            ValidateError::Config(ConfigError::UnsupportedLevelVersion { level: 4, version: 1 })
        ));
    }

    #[test]
    fn unknown_rule_in_config_is_refused() {
        let config = Config::parse("[rules.99999]\nenabled = false\n").unwrap();
        let err = validate_with(&Document::new(3, 1, None), &config).unwrap_err();
        assert!(matches!(err, ValidateError::Config(ConfigError::UnknownRule { .. })));
    }

    #[test]
    fn config_can_silence_a_rule() {
        let config = Config::parse("[rules.20201]\nseverity = \"info\"\n").unwrap();
        let log = validate_with(&Document::new(3, 1, None), &config).unwrap();
        assert!(!log.has_errors());
        assert_eq!(log.count_by_severity(Severity::Info), 1);
    }

    #[test]
    fn absolute_paths_are_kept() {
        let path = Path::new("/models/a.json");
        assert_eq!(resolve_test_path(path), path);
    }
}
