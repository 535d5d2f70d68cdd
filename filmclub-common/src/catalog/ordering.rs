//! Persisted catalog ordering policy

use crate::catalog::models::CatalogRecord;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// Date layouts seen in the watch-date column
const WATCH_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// How records are ordered when the catalog is written back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogOrder {
    /// Keep existing order, new records at the end
    #[default]
    Insertion,
    /// Most recent watch date first; unparseable or missing dates last
    WatchDateDesc,
}

impl CatalogOrder {
    /// Reorder `records` in place (stable: ties keep their relative order)
    pub fn apply(self, records: &mut [CatalogRecord]) {
        match self {
            CatalogOrder::Insertion => {}
            CatalogOrder::WatchDateDesc => {
                records.sort_by_cached_key(|record| {
                    let date = record.watch_date().and_then(parse_watch_date);
                    (date.is_none(), Reverse(date))
                });
            }
        }
    }
}

impl FromStr for CatalogOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insertion" => Ok(CatalogOrder::Insertion),
            "watch-date-desc" | "watch_date_desc" => Ok(CatalogOrder::WatchDateDesc),
            other => Err(Error::InvalidInput(format!(
                "Unknown catalog order '{}' (expected 'insertion' or 'watch-date-desc')",
                other
            ))),
        }
    }
}

impl fmt::Display for CatalogOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogOrder::Insertion => f.write_str("insertion"),
            CatalogOrder::WatchDateDesc => f.write_str("watch-date-desc"),
        }
    }
}

/// Parse free-form watch-date text, `None` if no known layout matches
pub fn parse_watch_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    WATCH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}
