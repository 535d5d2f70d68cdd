//! Configuration file schema and loading
//!
//! The TOML file is the lowest-priority source of run parameters; command-line
//! arguments and environment variables override it. A missing file is not an
//! error: every field has a built-in default or is optional.

use crate::catalog::CatalogOrder;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Club members whose rating columns are read when no roster is configured
pub const DEFAULT_ROSTER: &[&str] = &["andy", "gabe", "jacob", "joey", "greg"];

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Sheet id, export URL, or local CSV path
    #[serde(default)]
    pub sheet_source: Option<String>,

    /// Path to the catalog JSON file
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// OMDb API key (primary metadata provider)
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// TMDB API read access token (crew enrichment)
    #[serde(default)]
    pub tmdb_api_token: Option<String>,

    /// Club member ids, in rating-merge order
    #[serde(default)]
    pub roster: Option<Vec<String>>,

    /// Ordering applied when the catalog is written
    #[serde(default)]
    pub catalog_order: Option<CatalogOrder>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default config file location (`<config dir>/filmclub/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("filmclub").join("config.toml"))
}

/// Load TOML configuration from `path`
///
/// A missing file yields the defaults; an unreadable or unparseable file is
/// a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Validate a credential (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// User-Agent sent with every outbound HTTP request
pub fn get_user_agent() -> String {
    format!(
        "filmclub-sync/{} (+https://github.com/filmclub/filmclub)",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   \t"));
    }

    #[test]
    fn test_toml_parses_all_fields() {
        let config: TomlConfig = toml::from_str(
            r#"
            sheet_source = "1AbCdEf"
            catalog_path = "src/assets/films.json"
            omdb_api_key = "omdb"
            tmdb_api_token = "tmdb"
            roster = ["andy", "gabe"]
            catalog_order = "watch-date-desc"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.sheet_source.as_deref(), Some("1AbCdEf"));
        assert_eq!(config.catalog_path, Some(PathBuf::from("src/assets/films.json")));
        assert_eq!(config.roster, Some(vec!["andy".to_string(), "gabe".to_string()]));
        assert_eq!(config.catalog_order, Some(CatalogOrder::WatchDateDesc));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.omdb_api_key.is_none());
        assert!(config.roster.is_none());
        assert_eq!(config.logging.level, "info");
    }
}
