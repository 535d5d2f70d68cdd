//! Error types for filmclub-sync
//!
//! Only failures that end a run surface here: the sheet could not be
//! obtained, the catalog could not be written, or the run was misconfigured.
//! Per-row problems are logged and absorbed by the reconciler.

use thiserror::Error;

use crate::providers::ProviderError;
use crate::sheet::SheetError;

/// Run-level error
#[derive(Debug, Error)]
pub enum SyncError {
    /// Sheet fetch or parse failed; the catalog is left untouched
    #[error("Sheet unavailable: {0}")]
    Sheet(#[from] SheetError),

    /// Provider client could not be constructed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Catalog persistence failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] filmclub_common::Error),

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type for sync operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;
