//! Sync workflow
//!
//! One pass: load catalog → fetch sheet → reconcile → order → persist.
//! The catalog is written only when the pass changed something, and never in
//! a dry run.

use std::path::Path;
use std::sync::Arc;

use filmclub_common::catalog::{load_catalog, save_catalog, CatalogOrder};
use filmclub_common::config::get_user_agent;
use tracing::{error, info};

use crate::config::RunConfig;
use crate::error::SyncResult;
use crate::providers::{OmdbClient, TmdbClient};
use crate::services::{export_csv_file, ChangeReport, RecordReconciler};
use crate::sheet::{SheetClient, SheetRow};

/// Result of one sync pass
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub report: ChangeReport,
    /// Records in the catalog after the pass
    pub records: usize,
    /// Whether the catalog file was rewritten
    pub written: bool,
}

/// Run a full pass with live providers
pub async fn run_sync(config: &RunConfig, dry_run: bool) -> SyncResult<SyncSummary> {
    let source = config.require_sheet()?;
    let user_agent = get_user_agent();

    let sheet = SheetClient::new(&user_agent)?;
    let rows = sheet.fetch_rows(source).await?;

    let primary = Arc::new(OmdbClient::new(config.omdb_api_key.clone(), &user_agent)?);
    let secondary = Arc::new(TmdbClient::new(config.tmdb_api_token.clone(), &user_agent)?);
    let reconciler = RecordReconciler::new(primary, secondary, config.roster.clone());

    sync_catalog(
        &config.catalog_path,
        config.catalog_order,
        &rows,
        &reconciler,
        dry_run,
    )
    .await
}

/// Reconcile already-fetched rows against the catalog at `catalog_path`
pub async fn sync_catalog(
    catalog_path: &Path,
    order: CatalogOrder,
    rows: &[SheetRow],
    reconciler: &RecordReconciler,
    dry_run: bool,
) -> SyncResult<SyncSummary> {
    let mut catalog = load_catalog(catalog_path);
    let report = reconciler.reconcile(&mut catalog, rows).await;
    report.log_summary();

    let mut summary = SyncSummary {
        records: catalog.len(),
        written: false,
        report,
    };

    if !summary.report.has_changes() {
        info!(path = %catalog_path.display(), "No changes, catalog left untouched");
        return Ok(summary);
    }

    if dry_run {
        info!(
            path = %catalog_path.display(),
            fields = ?summary.report.changed_fields(),
            "Dry run, changes not written"
        );
        return Ok(summary);
    }

    order.apply(&mut catalog);
    if let Err(e) = save_catalog(catalog_path, &catalog) {
        error!(path = %catalog_path.display(), error = %e, "Failed to write catalog");
        return Err(e.into());
    }

    summary.written = true;
    Ok(summary)
}

/// Write the current catalog as CSV; returns the number of records exported
pub fn export_catalog_csv(config: &RunConfig, output: &Path) -> SyncResult<usize> {
    let catalog = load_catalog(&config.catalog_path);
    export_csv_file(output, &catalog, &config.roster)?;
    Ok(catalog.len())
}
