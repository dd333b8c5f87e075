//! Integration tests for the facade entry points.

use sbml_lint::rules::Preset;
use sbml_lint::{validate_file, Config, PackageTag, RuleId, ValidateError};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn flux_balance_model_is_consistent() {
    let log = validate_file(fixture("flux_balance.json")).unwrap();
    assert!(log.is_empty(), "{}", log.format_report());
}

#[test]
fn assert_consistent_resolves_against_the_manifest() {
    sbml_lint::assert_consistent("tests/fixtures/flux_balance.json");
}

#[test]
#[should_panic(expected = "is not consistent")]
fn assert_consistent_panics_with_the_report() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("empty.json");
    std::fs::write(&path, r#"{"level": 3, "version": 1}"#).unwrap();
    sbml_lint::assert_consistent(&path);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = validate_file(fixture("absent.json")).unwrap_err();
    assert!(matches!(err, ValidateError::Io { .. }));
}

#[test]
fn unknown_package_is_a_load_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("layout.json");
    std::fs::write(&path, r#"{"level": 3, "version": 1, "packages": ["layout"]}"#).unwrap();
    assert!(matches!(validate_file(&path), Err(ValidateError::Load(_))));
}

#[test]
fn core_only_settings_skip_the_package() {
    let content = std::fs::read_to_string(fixture("flux_balance.json")).unwrap();
    let document = sbml_lint::Document::from_json(&content).unwrap();
    assert!(document.packages().contains(&PackageTag::Fbc));

    let mut config = Config::new();
    config.validation.packages = Some(Vec::new());
    config.validation.categories = Some(Preset::Structural.categories().into_iter().collect());
    let log = sbml_lint::validate_with(&document, &config).unwrap();
    assert!(!log.contains(RuleId::new(2_020_101)));
    assert!(log.is_empty());
}
