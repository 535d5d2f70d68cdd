//! Sheet CSV transport
//!
//! A sheet locator is one of:
//! - a bare Google Sheet id (fetched through the public CSV export URL)
//! - an `http://` / `https://` URL returning CSV
//! - a path to a local CSV file

use std::fmt;
use std::path::PathBuf;

use reqwest::Client;

use super::row::{parse_rows, SheetRow};
use super::SheetError;

const GOOGLE_SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Where the sheet CSV is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSource {
    GoogleSheet(String),
    Url(String),
    File(PathBuf),
}

impl SheetSource {
    /// Classify a locator string
    pub fn parse(locator: &str) -> Self {
        let locator = locator.trim();
        if locator.starts_with("http://") || locator.starts_with("https://") {
            SheetSource::Url(locator.to_string())
        } else if looks_like_path(locator) {
            SheetSource::File(PathBuf::from(locator))
        } else {
            SheetSource::GoogleSheet(locator.to_string())
        }
    }

    /// CSV export URL for remote sources
    pub fn export_url(&self) -> Option<String> {
        match self {
            SheetSource::GoogleSheet(id) => {
                Some(format!("{}/{}/export?format=csv", GOOGLE_SHEETS_BASE_URL, id))
            }
            SheetSource::Url(url) => Some(url.clone()),
            SheetSource::File(_) => None,
        }
    }
}

impl fmt::Display for SheetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSource::GoogleSheet(id) => write!(f, "google sheet {}", id),
            SheetSource::Url(url) => write!(f, "{}", url),
            SheetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Sheet ids are URL-safe base64-ish tokens; anything with a separator or a
/// file extension is treated as a path
fn looks_like_path(locator: &str) -> bool {
    locator.contains('/')
        || locator.contains('\\')
        || locator.to_ascii_lowercase().ends_with(".csv")
}

/// Fetches and parses the sheet
pub struct SheetClient {
    http_client: Client,
}

impl SheetClient {
    pub fn new(user_agent: &str) -> Result<Self, SheetError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| SheetError::NetworkError(e.to_string()))?;
        Ok(Self { http_client })
    }

    /// Read the raw CSV text
    pub async fn fetch_csv(&self, source: &SheetSource) -> Result<String, SheetError> {
        let url = match source {
            SheetSource::File(path) => {
                tracing::debug!(path = %path.display(), "Reading sheet CSV from file");
                return Ok(tokio::fs::read_to_string(path).await?);
            }
            remote => remote.export_url().unwrap_or_default(),
        };

        tracing::debug!(url = %url, "Fetching sheet CSV");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SheetError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| SheetError::NetworkError(e.to_string()))
    }

    /// Fetch and parse into rows
    pub async fn fetch_rows(&self, source: &SheetSource) -> Result<Vec<SheetRow>, SheetError> {
        let csv_text = self.fetch_csv(source).await?;
        let rows = parse_rows(&csv_text)?;
        tracing::info!(source = %source, rows = rows.len(), "Sheet loaded");
        Ok(rows)
    }
}
