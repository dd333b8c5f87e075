//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_NAME: &str = "sbml-lint.toml";

const DEFAULT_CONFIG: &str = r#"# sbml-lint configuration
# Flags given to `sbml-lint check` take precedence over this file.

[validation]
# Validate against a fixed level and version instead of each document's own.
# Both must name a published specification (L1V1-2, L2V1-5, L3V1-2).
# level = 3
# version = 2

# Categories to check (default: all).
categories = [
    "general-consistency",
    "identifier-consistency",
    "mathml-consistency",
    "sbo-consistency",
    "units-consistency",
    "overdetermined-model",
    # "modeling-practice",
]

# Packages to check (default: those each document declares).
# Packages are only checked for level 3 documents.
# packages = ["qual", "fbc"]

# Rule settings, keyed by numeric rule id.
# Run `sbml-lint list-rules` to see the ids.

# [rules.10513]
# severity = "error"   # fatal, error, warning or info

# [rules.80701]
# enabled = false
"#;

/// Runs the init command, writing the config into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to choose categories and rule severities");
    println!("  2. Run: sbml-lint check models/");

    Ok(())
}
