//! Locating and loading `sbml-lint.toml`.
//!
//! The first match wins:
//!
//! 1. `--config` (or `$SBML_LINT_CONFIG`)
//! 2. `sbml-lint.toml` or `.sbml-lint.toml` in the model directory or any ancestor
//! 3. `config.toml` in `$SBML_LINT_CONFIG_DIR`, else `~/.sbml-lint/`
//! 4. Built-in defaults

use anyhow::{Context, Result};
use sbml_lint_core::Config;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line.
    Explicit(PathBuf),
    /// Found next to the models or in a parent directory.
    Project(PathBuf),
    /// The user-wide file.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the file behind this source, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads and checks the configuration.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML, or holds
    /// inconsistent settings.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::new());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

const PROJECT_FILES: [&str; 2] = ["sbml-lint.toml", ".sbml-lint.toml"];

/// Resolves the configuration for models under `start`.
#[must_use]
pub fn resolve(start: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_from(start, explicit, user_config_dir())
}

fn resolve_from(start: &Path, explicit: Option<&Path>, user_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_upwards(start) {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    user_dir
        .map(|dir| dir.join("config.toml"))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Walks from `start` to the filesystem root, returning the first project file.
fn find_upwards(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// `$SBML_LINT_CONFIG_DIR`, else `~/.sbml-lint`.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SBML_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".sbml-lint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbml_lint_core::{Category, RuleId, Severity};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_and_is_not_checked_for_existence() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("sbml-lint.toml"), "").unwrap();

        let result = resolve_from(tmp.path(), Some(Path::new("/nowhere/custom.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nowhere/custom.toml"))
        );
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("sbml-lint.toml"), "").unwrap();
        fs::write(tmp.path().join(".sbml-lint.toml"), "").unwrap();

        let result = resolve_from(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(tmp.path().join("sbml-lint.toml"))
        );
    }

    #[test]
    fn project_file_found_in_ancestor() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".sbml-lint.toml"), "").unwrap();
        let nested = tmp.path().join("models").join("curated");
        fs::create_dir_all(&nested).unwrap();

        let result = resolve_from(&nested, None, None);
        assert_eq!(
            result,
            ConfigSource::Project(tmp.path().join(".sbml-lint.toml"))
        );
    }

    #[test]
    fn nearest_project_file_wins() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("sbml-lint.toml"), "").unwrap();
        let nested = tmp.path().join("models");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("sbml-lint.toml"), "").unwrap();

        let result = resolve_from(&nested, None, None);
        assert_eq!(result, ConfigSource::Project(nested.join("sbml-lint.toml")));
    }

    #[test]
    fn user_file_is_the_fallback() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(user.path().join("config.toml"), "").unwrap();

        let result = resolve_from(project.path(), None, Some(user.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Global(user.path().join("config.toml")));
    }

    #[test]
    fn empty_user_dir_means_defaults() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let result = resolve_from(project.path(), None, Some(user.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
    }

    #[test]
    fn default_source_loads_defaults() {
        assert_eq!(ConfigSource::Default.load().unwrap(), Config::new());
    }

    #[test]
    fn load_reads_validation_and_rules() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sbml-lint.toml");
        fs::write(
            &path,
            r#"
[validation]
categories = ["general-consistency", "units-consistency"]

[rules.10513]
severity = "error"

[rules.80701]
enabled = false
"#,
        )
        .unwrap();

        let config = ConfigSource::Project(path).load().unwrap();
        assert_eq!(
            config.validation.categories,
            Some(vec![Category::GeneralConsistency, Category::UnitsConsistency])
        );
        assert_eq!(config.rule_severity(RuleId::new(10513)), Some(Severity::Error));
        assert!(!config.is_rule_enabled(RuleId::new(80701)));
    }

    #[test]
    fn load_names_the_failing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sbml-lint.toml");
        fs::write(&path, "[rules.not-a-number]\nenabled = false\n").unwrap();

        let err = ConfigSource::Explicit(path.clone()).load().unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn display_names_the_origin() {
        assert_eq!(ConfigSource::Default.to_string(), "built-in defaults");
        assert!(ConfigSource::Global(PathBuf::from("/u/config.toml"))
            .to_string()
            .ends_with("(global)"));
    }
}
