//! filmclub-sync library interface
//!
//! Reconciles the club's rating sheet against the film catalog and enriches
//! new films from OMDb and TMDB. Exposed as a library for integration tests.

pub mod config;
pub mod error;
pub mod providers;
pub mod services;
pub mod sheet;
pub mod workflow;

pub use crate::error::{SyncError, SyncResult};
pub use crate::services::{ChangeReport, FieldChange, RecordReconciler};
pub use crate::workflow::{export_catalog_csv, run_sync, sync_catalog, SyncSummary};
