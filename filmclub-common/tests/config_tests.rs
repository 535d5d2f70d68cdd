//! Configuration file loading tests
//!
//! A missing TOML file must not stop a run; a broken one is reported.

use filmclub_common::catalog::CatalogOrder;
use filmclub_common::config::{load_toml_config, DEFAULT_ROSTER};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_toml_config(&dir.path().join("config.toml")).unwrap();

    assert!(config.sheet_source.is_none());
    assert!(config.catalog_order.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_config_file_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "catalog_path = \"films.json\"\ncatalog_order = \"insertion\"\n",
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.catalog_path.unwrap().to_str(), Some("films.json"));
    assert_eq!(config.catalog_order, Some(CatalogOrder::Insertion));
}

#[test]
fn test_broken_config_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "roster = [\"andy\",").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(err.to_string().contains("Parse TOML failed"));
}

#[test]
fn test_default_roster() {
    assert_eq!(DEFAULT_ROSTER, &["andy", "gabe", "jacob", "joey", "greg"]);
}
