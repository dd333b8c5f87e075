//! List rules command implementation.

use anyhow::{Context, Result};
use sbml_lint_core::{Catalog, Category, MessageCatalog, PackageTag, RuleId, Severity};
use sbml_lint_rules::{builtin_messages, standard_catalog, Preset};

struct Row {
    id: RuleId,
    package: Option<PackageTag>,
    category: Category,
    severity: Severity,
    applies: String,
    summary: &'static str,
}

fn rows(
    catalog: &Catalog,
    messages: &MessageCatalog,
    package: Option<PackageTag>,
    category: Option<Category>,
) -> Vec<Row> {
    catalog
        .rules()
        .map(|rule| Row {
            id: rule.id(),
            package: catalog.package_for(rule.id()),
            category: rule.category(),
            severity: messages
                .get(rule.id())
                .map_or(Severity::Error, |m| m.severity),
            applies: rule.level_gate().to_string(),
            summary: rule.summary(),
        })
        .filter(|row| package.map_or(true, |p| row.package == Some(p)))
        .filter(|row| category.map_or(true, |c| row.category == c))
        .collect()
}

/// Runs the list-rules command.
pub fn run(package: Option<PackageTag>, category: Option<Category>) -> Result<()> {
    let catalog = standard_catalog().context("Failed to build the rule catalog")?;
    let messages = builtin_messages().context("Failed to parse the built-in messages")?;
    let rows = rows(&catalog, &messages, package, category);

    println!("Available rules:\n");
    println!(
        "{:<9} {:<6} {:<23} {:<8} {:<13} Description",
        "Id", "Pkg", "Category", "Severity", "Applies"
    );
    println!("{}", "-".repeat(100));

    for row in &rows {
        println!(
            "{:<9} {:<6} {:<23} {:<8} {:<13} {}",
            row.id.to_string(),
            row.package.map_or("core", PackageTag::as_str),
            row.category.as_str(),
            row.severity.as_str(),
            row.applies,
            row.summary
        );
    }
    println!("\n{} rule(s)", rows.len());

    println!("\nPresets:");
    for preset in Preset::ALL {
        let names: Vec<&str> = preset.categories().into_iter().map(Category::as_str).collect();
        println!("  {:<12} - {}", preset.as_str(), names.join(", "));
    }

    println!("\nUse --preset or --categories to choose what a check runs, e.g.:");
    println!("  sbml-lint check --preset recommended models/");
    println!("  sbml-lint check --categories general-consistency,units-consistency");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogs() -> (std::sync::Arc<Catalog>, std::sync::Arc<MessageCatalog>) {
        (standard_catalog().unwrap(), builtin_messages().unwrap())
    }

    #[test]
    fn unfiltered_lists_every_rule_in_id_order() {
        let (catalog, messages) = catalogs();
        let all = rows(&catalog, &messages, None, None);
        assert_eq!(all.len(), catalog.rules().count());
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn package_filter_keeps_its_range() {
        let (catalog, messages) = catalogs();
        let qual = rows(&catalog, &messages, Some(PackageTag::Qual), None);
        assert!(!qual.is_empty());
        assert!(qual
            .iter()
            .all(|r| (3_000_000..=3_999_999).contains(&r.id.get())));
    }

    #[test]
    fn category_filter_uses_message_severity() {
        let (catalog, messages) = catalogs();
        let units = rows(&catalog, &messages, None, Some(Category::UnitsConsistency));
        assert!(!units.is_empty());
        assert!(units.iter().all(|r| r.severity == Severity::Warning));
    }
}
