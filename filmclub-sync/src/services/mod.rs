//! Reconciliation services

pub mod change_detector;
pub mod csv_exporter;
pub mod rating_merger;
pub mod record_reconciler;

pub use change_detector::{ChangeDetector, ChangeReport, FieldChange, Snapshot};
pub use csv_exporter::{export_csv, export_csv_file, export_header};
pub use rating_merger::{member_cells, merge_ratings, normalize_blurb, normalize_score, MemberCells};
pub use record_reconciler::RecordReconciler;
