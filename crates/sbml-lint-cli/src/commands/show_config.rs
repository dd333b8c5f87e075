//! Show-config command implementation.

use anyhow::Result;
use sbml_lint_core::Config;

use crate::config_resolver::ConfigSource;

/// Prints where the configuration comes from and its effective contents.
pub fn run(source: &ConfigSource) -> Result<()> {
    let config = source.load()?;
    println!("# source: {source}");
    print!("{}", render(&config)?);
    Ok(())
}

fn render(config: &Config) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbml_lint_core::{Category, RuleConfig, Severity};

    #[test]
    fn rendered_config_parses_back() {
        let mut config = Config::new();
        config.validation.level = Some(3);
        config.validation.version = Some(2);
        config.validation.categories = Some(vec![Category::UnitsConsistency]);
        config.rules.insert(
            "10513".to_string(),
            RuleConfig {
                enabled: None,
                severity: Some(Severity::Error),
            },
        );

        let text = render(&config).unwrap();
        assert!(text.contains("[rules.10513]"));
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn defaults_render_empty_tables() {
        let text = render(&Config::new()).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), Config::new());
    }
}
