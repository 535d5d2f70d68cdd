//! Run configuration resolution for filmclub-sync
//!
//! Every run parameter is resolved with **CLI → ENV → TOML → default**
//! priority. Credentials are checked for being non-blank, and a warning is
//! logged when the same credential is present in more than one source.

use std::path::PathBuf;
use std::str::FromStr;

use filmclub_common::catalog::CatalogOrder;
use filmclub_common::config::{is_valid_key, TomlConfig, DEFAULT_ROSTER};
use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};
use crate::sheet::SheetSource;

pub const ENV_SHEET_ID: &str = "SHEET_ID";
pub const ENV_JSON_PATH: &str = "JSON_PATH";
pub const ENV_OMDB_API_KEY: &str = "OMDB_API_KEY";
pub const ENV_TMDB_API_TOKEN: &str = "TMDB_API_TOKEN";
pub const ENV_ROSTER: &str = "FILMCLUB_ROSTER";
pub const ENV_CATALOG_ORDER: &str = "FILMCLUB_CATALOG_ORDER";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub sheet: Option<String>,
    pub catalog: Option<PathBuf>,
    pub omdb_api_key: Option<String>,
    pub tmdb_api_token: Option<String>,
    pub roster: Option<Vec<String>>,
    pub catalog_order: Option<CatalogOrder>,
}

/// Fully resolved parameters for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// `None` only matters for commands that read the sheet
    pub sheet_source: Option<SheetSource>,
    pub catalog_path: PathBuf,
    pub omdb_api_key: Option<String>,
    pub tmdb_api_token: Option<String>,
    pub roster: Vec<String>,
    pub catalog_order: CatalogOrder,
}

impl RunConfig {
    /// Sheet source, or a configuration error naming how to set it
    pub fn require_sheet(&self) -> SyncResult<&SheetSource> {
        self.sheet_source.as_ref().ok_or_else(|| {
            SyncError::Config(format!(
                "Sheet source not configured. Use --sheet, {} or sheet_source in the config file",
                ENV_SHEET_ID
            ))
        })
    }
}

/// Resolve all run parameters
pub fn resolve_run_config(cli: &CliOverrides, toml_config: &TomlConfig) -> SyncResult<RunConfig> {
    let sheet_source = first_text(
        cli.sheet.as_deref(),
        env_var(ENV_SHEET_ID).as_deref(),
        toml_config.sheet_source.as_deref(),
    )
    .map(|locator| SheetSource::parse(&locator));

    let catalog_path = cli
        .catalog
        .clone()
        .or_else(|| env_var(ENV_JSON_PATH).map(PathBuf::from))
        .or_else(|| toml_config.catalog_path.clone())
        .ok_or_else(|| {
            SyncError::Config(format!(
                "Catalog path not configured. Use --catalog, {} or catalog_path in the config file",
                ENV_JSON_PATH
            ))
        })?;

    let omdb_api_key = resolve_credential(
        "OMDb API key",
        cli.omdb_api_key.as_deref(),
        ENV_OMDB_API_KEY,
        toml_config.omdb_api_key.as_deref(),
    );
    let tmdb_api_token = resolve_credential(
        "TMDB API token",
        cli.tmdb_api_token.as_deref(),
        ENV_TMDB_API_TOKEN,
        toml_config.tmdb_api_token.as_deref(),
    );

    if omdb_api_key.is_none() {
        warn!("OMDb API key not configured; new films cannot be added");
    }
    if tmdb_api_token.is_none() {
        info!("TMDB API token not configured; crew enrichment disabled");
    }

    let roster = match (&cli.roster, env_var(ENV_ROSTER), &toml_config.roster) {
        (Some(list), _, _) => clean_roster(list.iter().map(String::as_str)),
        (None, Some(text), _) => parse_roster(&text),
        (None, None, Some(list)) => clean_roster(list.iter().map(String::as_str)),
        (None, None, None) => Vec::new(),
    };
    let roster = if roster.is_empty() {
        DEFAULT_ROSTER.iter().map(|m| m.to_string()).collect()
    } else {
        roster
    };

    let catalog_order = match (cli.catalog_order, env_var(ENV_CATALOG_ORDER)) {
        (Some(order), _) => order,
        (None, Some(text)) => CatalogOrder::from_str(&text)
            .map_err(|e| SyncError::Config(e.to_string()))?,
        (None, None) => toml_config.catalog_order.unwrap_or_default(),
    };

    Ok(RunConfig {
        sheet_source,
        catalog_path,
        omdb_api_key,
        tmdb_api_token,
        roster,
        catalog_order,
    })
}

/// Comma-separated member list; blanks dropped, ids lower-cased
pub fn parse_roster(text: &str) -> Vec<String> {
    clean_roster(text.split(','))
}

fn clean_roster<'a>(members: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut roster: Vec<String> = Vec::new();
    for member in members.map(|m| m.trim().to_lowercase()) {
        if !member.is_empty() && !roster.contains(&member) {
            roster.push(member);
        }
    }
    roster
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn first_text(cli: Option<&str>, env: Option<&str>, toml: Option<&str>) -> Option<String> {
    [cli, env, toml]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Pick the highest-priority valid credential
fn resolve_credential(
    label: &str,
    cli: Option<&str>,
    env_name: &str,
    toml: Option<&str>,
) -> Option<String> {
    let env = std::env::var(env_name).ok();
    let candidates = [
        ("command line", cli),
        ("environment", env.as_deref()),
        ("TOML", toml),
    ];

    let valid: Vec<(&str, &str)> = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)))
        .collect();

    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            label,
            sources.join(", "),
            sources[0]
        );
    }

    valid.first().map(|(source, key)| {
        info!("{} loaded from {}", label, source);
        key.trim().to_string()
    })
}
