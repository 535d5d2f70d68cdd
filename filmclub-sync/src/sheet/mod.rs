//! Spreadsheet input: where the CSV comes from and how rows are read

pub mod row;
pub mod source;

pub use row::{normalize_header, normalize_identifier, parse_rows, SheetRow};
pub use source::{SheetClient, SheetSource};

use thiserror::Error;

/// Sheet source errors
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Sheet export returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Sheet file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),
}
