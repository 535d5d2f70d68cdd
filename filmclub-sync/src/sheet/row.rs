//! Sheet rows and identifier normalization

use std::collections::HashMap;

use super::SheetError;

/// Identifier column
pub const IDENTIFIER_COLUMN: &str = "imdb_id";
/// Watch date column
pub const WATCH_DATE_COLUMN: &str = "watch_date";
/// Selector column
pub const SELECTOR_COLUMN: &str = "selected_by";
/// Trophy notes column
pub const TROPHY_NOTES_COLUMN: &str = "trophy_notes";

/// Cell values spreadsheet exports use for "nothing here"
const MISSING_SENTINELS: &[&str] = &["nan", "none", "null", "n/a", "#n/a"];

/// One spreadsheet line, keyed by normalized column name
///
/// A column absent from the sheet and a column present with an empty cell
/// are different things: [`SheetRow::cell`] returns `None` for the former and
/// `Some("")` for the latter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    cells: HashMap<String, String>,
}

impl SheetRow {
    /// Build a row from (column, value) pairs; column names are normalized
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (normalize_header(k.as_ref()), v.into()))
                .collect(),
        }
    }

    /// Raw cell text, `None` if the column isn't in the sheet
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Cell text if the column exists and the cell is not blank
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.cell(column).filter(|v| !v.trim().is_empty())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Normalized identifier, `None` if the row can't be acted on
    pub fn identifier(&self) -> Option<String> {
        normalize_identifier(self.cell(IDENTIFIER_COLUMN))
    }

    pub fn watch_date(&self) -> Option<&str> {
        self.non_empty(WATCH_DATE_COLUMN)
    }

    pub fn selector(&self) -> Option<&str> {
        self.non_empty(SELECTOR_COLUMN)
    }

    /// `None` when the sheet has no trophy-notes column at all,
    /// `Some(None)` when the column exists but this cell is blank
    pub fn trophy_notes(&self) -> Option<Option<&str>> {
        self.cell(TROPHY_NOTES_COLUMN)
            .map(|v| if v.trim().is_empty() { None } else { Some(v) })
    }

    /// `{member}_rating` cell
    pub fn rating(&self, member: &str) -> Option<&str> {
        self.cell(&format!("{}_rating", member.to_lowercase()))
    }

    /// `{member}_blurb` cell
    pub fn blurb(&self, member: &str) -> Option<&str> {
        self.cell(&format!("{}_blurb", member.to_lowercase()))
    }
}

/// Normalize a column header: trimmed, lower-cased, spaces to underscores
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Canonicalize an identifier cell
///
/// Returns `None` for missing, blank, or missing-value sentinel cells. Any
/// other text is returned trimmed and otherwise unvalidated.
pub fn normalize_identifier(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    if MISSING_SENTINELS
        .iter()
        .any(|sentinel| value.eq_ignore_ascii_case(sentinel))
    {
        return None;
    }
    Some(value.to_string())
}

/// Parse CSV text into rows
///
/// Headers are normalized and fully blank lines are skipped. Short records
/// are padded: every named column is present in every row, with `""` for
/// cells the record doesn't reach.
pub fn parse_rows(csv_text: &str) -> Result<Vec<SheetRow>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(csv_text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SheetError::Csv(e.to_string()))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SheetError::Csv(e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cells = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(SheetRow { cells });
    }

    tracing::debug!(rows = rows.len(), columns = headers.len(), "Parsed sheet CSV");
    Ok(rows)
}
