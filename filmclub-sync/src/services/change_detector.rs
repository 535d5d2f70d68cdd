//! Change detection
//!
//! Two signals are kept for every pass:
//! - canonical before/after snapshots of each existing record, which decide
//!   whether the catalog needs writing
//! - per-field deltas returned by every mutation step, which feed the run
//!   report and the logs

use std::fmt;

use filmclub_common::CatalogRecord;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// One field-level mutation
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Dotted field path (`movieClubInfo.watchDate`, `clubRatings.andy`)
    pub field: String,
    pub before: Value,
    pub after: Value,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, before: &impl Serialize, after: &impl Serialize) -> Self {
        Self {
            field: field.into(),
            before: serde_json::to_value(before).unwrap_or(Value::Null),
            after: serde_json::to_value(after).unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.before, self.after)
    }
}

/// Order-independent serialized form of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn of(record: &CatalogRecord) -> Self {
        let value = serde_json::to_value(record).unwrap_or(Value::Null);
        Snapshot(canonicalize(value).to_string())
    }
}

/// Rebuild every object with its keys sorted
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Outcome of one pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeReport {
    /// Identifiers of records added in this pass
    pub created: Vec<String>,
    /// Existing records that changed, with their deltas
    pub updated: Vec<(String, Vec<FieldChange>)>,
    pub unchanged: usize,
    pub skipped_blank: usize,
    pub skipped_duplicate: usize,
    /// Identifiers whose primary lookup failed
    pub abandoned: Vec<String>,
}

impl ChangeReport {
    /// Whether the catalog must be persisted
    pub fn has_changes(&self) -> bool {
        !self.created.is_empty() || !self.updated.is_empty()
    }

    /// Names of all fields touched in this pass, deduplicated
    pub fn changed_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .updated
            .iter()
            .flat_map(|(_, changes)| changes.iter().map(|c| c.field.as_str()))
            .collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }

    pub fn log_summary(&self) {
        info!(
            created = self.created.len(),
            updated = self.updated.len(),
            unchanged = self.unchanged,
            skipped_blank = self.skipped_blank,
            skipped_duplicate = self.skipped_duplicate,
            abandoned = self.abandoned.len(),
            "Sync pass complete"
        );
        for (imdb_id, changes) in &self.updated {
            for change in changes {
                info!(imdb_id = %imdb_id, "{}", change);
            }
        }
    }
}

/// Accumulates the report while the reconciler walks the sheet
#[derive(Debug, Default)]
pub struct ChangeDetector {
    report: ChangeReport,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// New records always count as a change
    pub fn record_created(&mut self, imdb_id: &str) {
        self.report.created.push(imdb_id.to_string());
    }

    /// Compare an existing record against its snapshot from before the row
    ///
    /// Returns whether the record changed. The snapshot comparison is
    /// authoritative; `changes` is only carried into the report.
    pub fn observe_existing(
        &mut self,
        imdb_id: &str,
        before: &Snapshot,
        after: &CatalogRecord,
        changes: Vec<FieldChange>,
    ) -> bool {
        if *before == Snapshot::of(after) {
            self.report.unchanged += 1;
            return false;
        }
        self.report.updated.push((imdb_id.to_string(), changes));
        true
    }

    pub fn skipped_blank(&mut self) {
        self.report.skipped_blank += 1;
    }

    pub fn skipped_duplicate(&mut self) {
        self.report.skipped_duplicate += 1;
    }

    pub fn abandoned(&mut self, imdb_id: &str) {
        self.report.abandoned.push(imdb_id.to_string());
    }

    pub fn finish(self) -> ChangeReport {
        self.report
    }
}
