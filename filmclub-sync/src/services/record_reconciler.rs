//! Record reconciler
//!
//! Walks the sheet once, row by row, and folds each row into the in-memory
//! catalog.
//!
//! **Per-row flow:**
//! 1. Normalize the identifier; blank rows and repeats of an identifier
//!    already handled in this pass are dropped
//! 2. Look the identifier up in the catalog index
//! 3. Existing record: merge club info and ratings, then run the crew lookup
//!    if it has never been attempted for this record
//! 4. New record: fetch from the primary provider (row abandoned on
//!    failure), transcode keys, run the crew lookup, build club info from
//!    the row and append
//!
//! Rows are handled strictly in sequence; nothing is spawned.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use filmclub_common::{CatalogRecord, ClubInfo, EnrichmentStatus};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::change_detector::{ChangeDetector, ChangeReport, FieldChange, Snapshot};
use super::rating_merger::{member_cells, merge_ratings};
use crate::providers::{transcode_map, Metadata, PrimaryProvider, SecondaryProvider};
use crate::sheet::SheetRow;

/// Keys owned by the record's fixed fields; never stored as free metadata
const RESERVED_KEYS: &[&str] = &[
    "imdbID",
    "title",
    "enrichmentAttempted",
    "movieClubInfo",
    "response",
    "error",
];

/// Sheet → catalog reconciler
pub struct RecordReconciler {
    primary: Arc<dyn PrimaryProvider>,
    secondary: Arc<dyn SecondaryProvider>,
    roster: Vec<String>,
}

impl RecordReconciler {
    pub fn new(
        primary: Arc<dyn PrimaryProvider>,
        secondary: Arc<dyn SecondaryProvider>,
        roster: Vec<String>,
    ) -> Self {
        Self {
            primary,
            secondary,
            roster,
        }
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Run one pass of `rows` over `catalog`
    ///
    /// Existing records keep their positions; new records are appended in
    /// sheet order. No row-level failure escapes this call.
    pub async fn reconcile(
        &self,
        catalog: &mut Vec<CatalogRecord>,
        rows: &[SheetRow],
    ) -> ChangeReport {
        let mut index = build_index(catalog);
        let mut seen: HashSet<String> = HashSet::new();
        let mut detector = ChangeDetector::new();

        info!(
            rows = rows.len(),
            records = catalog.len(),
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            secondary_configured = self.secondary.is_configured(),
            "Reconciling sheet against catalog"
        );

        for (line, row) in rows.iter().enumerate() {
            let Some(imdb_id) = row.identifier() else {
                debug!(line = line + 1, "Skipping row without identifier");
                detector.skipped_blank();
                continue;
            };

            if !seen.insert(imdb_id.clone()) {
                warn!(imdb_id = %imdb_id, line = line + 1, "Duplicate identifier in sheet, keeping first occurrence");
                detector.skipped_duplicate();
                continue;
            }

            match index.get(&imdb_id).copied() {
                Some(position) => {
                    let record = &mut catalog[position];
                    let before = Snapshot::of(record);
                    let changes = if record.has_unreadable_club_info() {
                        warn!(imdb_id = %imdb_id, "Stored club info is unreadable, leaving record as is");
                        Vec::new()
                    } else {
                        self.update_existing(&imdb_id, record, row).await
                    };
                    if detector.observe_existing(&imdb_id, &before, record, changes) {
                        debug!(imdb_id = %imdb_id, "Record updated");
                    }
                }
                None => match self.create_record(&imdb_id, row).await {
                    Some(record) => {
                        index.insert(imdb_id.clone(), catalog.len());
                        catalog.push(record);
                        detector.record_created(&imdb_id);
                    }
                    None => detector.abandoned(&imdb_id),
                },
            }
        }

        detector.finish()
    }

    /// Merge a row into a record already in the catalog
    ///
    /// `imdb_id` is the normalized identifier the record was matched on.
    async fn update_existing(
        &self,
        imdb_id: &str,
        record: &mut CatalogRecord,
        row: &SheetRow,
    ) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        let club = record.club_info_mut();

        if let Some(date) = row.watch_date().map(str::trim) {
            if club.watch_date.as_deref() != Some(date) {
                changes.push(FieldChange::new("movieClubInfo.watchDate", &club.watch_date, &date));
                club.watch_date = Some(date.to_string());
            }
        }

        if let Some(selector) = row.selector().map(str::trim) {
            if club.selector.as_deref() != Some(selector) {
                changes.push(FieldChange::new("movieClubInfo.selector", &club.selector, &selector));
                club.selector = Some(selector.to_string());
            }
        }

        // Present-but-blank clears the notes
        if let Some(notes) = row.trophy_notes() {
            if club.trophy_notes.as_deref() != notes {
                changes.push(FieldChange::new("movieClubInfo.trophyNotes", &club.trophy_notes, &notes));
                club.trophy_notes = notes.map(str::to_string);
            }
        }

        changes.extend(merge_ratings(
            &mut club.club_ratings,
            member_cells(row, &self.roster),
        ));

        if !record.enrichment.is_attempted() && self.secondary.is_configured() {
            let crew = self.secondary.crew_fields(imdb_id).await;
            changes.extend(apply_fields(&mut record.metadata, crew));
            changes.push(FieldChange::new(
                "enrichmentAttempted",
                &record.enrichment.is_attempted(),
                &true,
            ));
            record.enrichment = EnrichmentStatus::Attempted;
        }

        changes
    }

    /// Build a record for an identifier not yet in the catalog
    ///
    /// `None` when the primary provider has nothing for it.
    async fn create_record(&self, imdb_id: &str, row: &SheetRow) -> Option<CatalogRecord> {
        let raw = match self.primary.fetch(imdb_id).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    imdb_id = %imdb_id,
                    provider = self.primary.name(),
                    error = %e,
                    "Primary lookup failed, skipping row"
                );
                return None;
            }
        };

        let mut metadata = transcode_map(raw);
        let title = metadata
            .remove("title")
            .and_then(|v| v.as_str().map(str::to_string));
        for key in RESERVED_KEYS {
            metadata.remove(*key);
        }

        let mut record = CatalogRecord::new(imdb_id, title, metadata);

        if self.secondary.is_configured() {
            let crew = self.secondary.crew_fields(imdb_id).await;
            apply_fields(&mut record.metadata, crew);
        }
        record.enrichment = EnrichmentStatus::Attempted;

        let mut club = ClubInfo {
            selector: row.selector().map(|s| s.trim().to_string()),
            watch_date: row.watch_date().map(|d| d.trim().to_string()),
            trophy_notes: row.trophy_notes().flatten().map(str::to_string),
            trophy_info: None,
            club_ratings: Vec::new(),
            extra: Map::new(),
        };
        merge_ratings(&mut club.club_ratings, member_cells(row, &self.roster));
        record.club_info = Some(club);

        info!(
            imdb_id = %imdb_id,
            title = record.title.as_deref().unwrap_or("Unknown"),
            "Added new film"
        );

        Some(record)
    }
}

/// Identifier → position; the first record wins for a repeated identifier
fn build_index(catalog: &[CatalogRecord]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(catalog.len());
    for (position, record) in catalog.iter().enumerate() {
        let imdb_id = record.imdb_id.trim();
        if imdb_id.is_empty() {
            continue;
        }
        if index.contains_key(imdb_id) {
            warn!(imdb_id = %imdb_id, position, "Catalog holds a repeated identifier");
            continue;
        }
        index.insert(imdb_id.to_string(), position);
    }
    index
}

/// Insert provider fields that differ from what's stored
fn apply_fields(target: &mut Map<String, Value>, fields: Metadata) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    for (key, value) in fields {
        if RESERVED_KEYS.contains(&key.as_str()) || target.get(&key) == Some(&value) {
            continue;
        }
        changes.push(FieldChange::new(key.clone(), &target.get(&key), &value));
        target.insert(key, value);
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_first_record_wins() {
        let catalog = vec![
            CatalogRecord::new("tt1", Some("first".into()), Map::new()),
            CatalogRecord::new("", None, Map::new()),
            CatalogRecord::new(" tt1 ", Some("second".into()), Map::new()),
            CatalogRecord::new("tt2", None, Map::new()),
        ];

        let index = build_index(&catalog);
        assert_eq!(index.len(), 2);
        assert_eq!(index["tt1"], 0);
        assert_eq!(index["tt2"], 3);
    }

    #[test]
    fn test_apply_fields_reports_only_differences() {
        let mut target = Map::new();
        target.insert("editor".into(), json!("A"));

        let mut fields = Metadata::new();
        fields.insert("editor".into(), json!("A"));
        fields.insert("composer".into(), json!("B"));
        fields.insert("imdbID".into(), json!("tt9"));

        let changes = apply_fields(&mut target, fields);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "composer");
        assert_eq!(target["composer"], json!("B"));
        assert!(!target.contains_key("imdbID"));
    }
}
