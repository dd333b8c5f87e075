//! Check command implementation.

use anyhow::{bail, Context, Result};
use sbml_lint_core::{Config, Document, ErrorLog, ValidationContext, ValidationContextBuilder};
use sbml_lint_rules::{builtin_messages, standard_catalog};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::CheckArgs;

/// Result of checking one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The document checked.
    pub path: PathBuf,
    /// Diagnostics, when the document could be validated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<ErrorLog>,
    /// Why the document could not be validated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// Returns true if the file failed to load or has errors.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.error.is_some() || self.log.as_ref().is_some_and(ErrorLog::has_errors)
    }
}

/// Result of a whole check run.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    /// One report per document, in path order.
    pub reports: Vec<FileReport>,
}

impl CheckOutcome {
    /// Returns true if any document failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.reports.iter().any(FileReport::failed)
    }
}

/// Directory the configuration search starts from.
#[must_use]
pub fn project_dir(paths: &[PathBuf]) -> PathBuf {
    let Some(first) = paths.first() else {
        return PathBuf::from(".");
    };
    if first.is_file() {
        first
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    } else {
        first.clone()
    }
}

/// Runs the check command.
///
/// # Errors
///
/// Fails on a bad configuration or a path that does not exist. Documents that
/// cannot be loaded are reported per file instead.
pub fn run(args: &CheckArgs, source: &ConfigSource) -> Result<CheckOutcome> {
    let config = source.load()?;
    let documents = collect_documents(&args.paths)?;
    if documents.is_empty() {
        bail!("No JSON documents found under {:?}", args.paths);
    }

    let mut context = context_builder(args, &config)?
        .build()
        .context("Invalid validation settings")?;

    tracing::info!(
        "Validating {} document(s) against {} categories",
        documents.len(),
        context.categories().len()
    );

    let reports = documents
        .into_iter()
        .map(|path| check_file(&mut context, path))
        .collect();

    Ok(CheckOutcome { reports })
}

/// Applies the configuration, then the command-line overrides on top.
fn context_builder(args: &CheckArgs, config: &Config) -> Result<ValidationContextBuilder> {
    let catalog = standard_catalog().context("Failed to build the rule catalog")?;
    let messages = builtin_messages().context("Failed to parse the built-in messages")?;

    let mut builder = ValidationContext::builder(catalog, messages).config(config)?;

    if let (Some(level), Some(version)) = (args.level, args.sbml_version) {
        builder = builder.level(level).version(version);
    }
    if let Some(preset) = args.preset {
        builder = builder.categories(preset.categories());
    } else if !args.categories.is_empty() {
        builder = builder.categories(args.categories.iter().copied());
    }
    if let Some(packages) = &args.packages {
        builder = builder.packages(packages.iter().copied());
    }
    Ok(builder)
}

fn check_file(context: &mut ValidationContext, path: PathBuf) -> FileReport {
    match validate_file(context, &path) {
        Ok(log) => {
            tracing::debug!("{}: {}", path.display(), log.summary());
            FileReport {
                path,
                log: Some(log),
                error: None,
            }
        }
        Err(err) => {
            tracing::warn!("{}: {err:#}", path.display());
            FileReport {
                path,
                log: None,
                error: Some(format!("{err:#}")),
            }
        }
    }
}

fn validate_file(context: &mut ValidationContext, path: &Path) -> Result<ErrorLog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = Document::from_json(&content).context("Failed to load document")?;
    context.clear();
    let log = context.validate(&document)?;
    Ok(log.clone())
}

/// Expands directories to the `.json` files below them, sorted by path.
fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_file() {
            documents.push(path.clone());
        } else if path.is_dir() {
            let pattern = format!(
                "{}/**/*.json",
                glob::Pattern::escape(&path.to_string_lossy())
            );
            let mut found: Vec<PathBuf> = glob::glob(&pattern)
                .with_context(|| format!("Invalid search pattern {pattern}"))?
                .filter_map(|entry| match entry {
                    Ok(p) => Some(p),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry: {e}");
                        None
                    }
                })
                .filter(|p| p.is_file())
                .collect();
            found.sort();
            documents.extend(found);
        } else {
            bail!("Path not found: {}", path.display());
        }
    }
    Ok(documents)
}
