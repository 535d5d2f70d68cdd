//! Catalog file persistence
//!
//! The catalog is read wholesale at the start of a pass and written back
//! wholesale at the end. Reading never fails: a missing or malformed file is
//! an empty catalog. Writing goes through a sibling temp file and a rename.

use crate::catalog::models::CatalogRecord;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load the catalog at `path`, treating missing or malformed input as empty
pub fn load_catalog(path: &Path) -> Vec<CatalogRecord> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Catalog file not found, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Catalog file unreadable, starting empty");
            return Vec::new();
        }
    };

    match parse_catalog(&text) {
        Ok(records) => {
            debug!(path = %path.display(), records = records.len(), "Catalog loaded");
            records
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Catalog file malformed, starting empty");
            Vec::new()
        }
    }
}

/// Parse catalog JSON text
///
/// The top level must be an array. Elements that are not objects are dropped
/// with a warning. Every object is kept: fixed fields that can't be read are
/// carried verbatim as metadata (see [`CatalogRecord::preserving`]).
pub fn parse_catalog(text: &str) -> Result<Vec<CatalogRecord>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(Error::InvalidInput(
            "Catalog must be a JSON array of film records".to_string(),
        ));
    };

    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!(position, "Skipping non-object catalog entry");
            continue;
        }
        let record = match CatalogRecord::deserialize(&item) {
            Ok(record) => record,
            Err(e) => {
                warn!(position, error = %e, "Catalog entry has unreadable fields, keeping them as stored");
                let Value::Object(object) = item else { continue };
                match CatalogRecord::preserving(object) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(position, error = %e, "Skipping unreadable catalog entry");
                        continue;
                    }
                }
            }
        };
        records.push(record);
    }
    Ok(records)
}

/// Render records as the on-disk JSON text (2-space indent, trailing newline)
pub fn render_catalog(records: &[CatalogRecord]) -> Result<String> {
    let mut text = serde_json::to_string_pretty(records)?;
    text.push('\n');
    Ok(text)
}

/// Write the catalog to `path`, replacing any existing file
pub fn save_catalog(path: &Path, records: &[CatalogRecord]) -> Result<()> {
    let text = render_catalog(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::Io(e));
    }

    info!(path = %path.display(), records = records.len(), "Catalog written");
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "catalog.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
