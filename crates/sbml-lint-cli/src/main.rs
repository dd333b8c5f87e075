//! sbml-lint CLI tool.
//!
//! Usage:
//! ```bash
//! sbml-lint check [OPTIONS] [PATHS]...
//! sbml-lint list-rules [--package qual] [--category units-consistency]
//! sbml-lint show-config
//! sbml-lint init
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sbml_lint_core::{Category, PackageTag};
use sbml_lint_rules::Preset;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Consistency validator for SBML models
#[derive(Parser)]
#[command(name = "sbml-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SBML_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate documents
    Check(CheckArgs),

    /// List available rules
    ListRules {
        /// Only list rules of this package
        #[arg(long)]
        package: Option<PackageTag>,

        /// Only list rules of this category
        #[arg(long)]
        category: Option<Category>,
    },

    /// Print the configuration a check in the current directory would use
    ShowConfig,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Options of the `check` command. Flags win over the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Documents or directories to validate (default: current directory)
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Validate against this SBML level instead of the document's
    #[arg(long, requires = "sbml_version")]
    pub level: Option<u32>,

    /// Validate against this SBML version instead of the document's
    #[arg(long, requires = "level")]
    pub sbml_version: Option<u32>,

    /// Only run these categories (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "preset")]
    pub categories: Vec<Category>,

    /// Check only these packages (comma-separated, empty for core only)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub packages: Option<Vec<PackageTag>>,

    /// Category preset: strict, recommended or structural
    #[arg(long)]
    pub preset: Option<Preset>,
}

/// Output format for validation results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(args) => {
            let project_dir = commands::check::project_dir(&args.paths);
            let source = config_resolver::resolve(&project_dir, cli.config.as_deref());
            let outcome = commands::check::run(&args, &source)?;
            commands::output::print(&outcome.reports, args.format)?;
            if outcome.failed() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules { package, category } => commands::list_rules::run(package, category),
        Commands::ShowConfig => {
            let source = config_resolver::resolve(std::path::Path::new("."), cli.config.as_deref());
            commands::show_config::run(&source)
        }
        Commands::Init { force } => commands::init::run(std::path::Path::new("."), force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_parses_lists_and_overrides() {
        let cli = Cli::try_parse_from([
            "sbml-lint",
            "check",
            "models",
            "--categories",
            "general-consistency,units-consistency",
            "--packages",
            "qual",
            "--level",
            "2",
            "--sbml-version",
            "4",
        ])
        .unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.paths, vec![PathBuf::from("models")]);
        assert_eq!(
            args.categories,
            vec![Category::GeneralConsistency, Category::UnitsConsistency]
        );
        assert_eq!(args.packages, Some(vec![PackageTag::Qual]));
        assert_eq!((args.level, args.sbml_version), (Some(2), Some(4)));
    }

    #[test]
    fn level_requires_version() {
        assert!(Cli::try_parse_from(["sbml-lint", "check", "--level", "3"]).is_err());
    }

    #[test]
    fn preset_and_categories_conflict() {
        let result = Cli::try_parse_from([
            "sbml-lint",
            "check",
            "--preset",
            "strict",
            "--categories",
            "sbo-consistency",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["sbml-lint", "check", "--categories", "style"]).is_err());
    }
}
