//! Metadata providers
//!
//! Two independent sources feed the catalog:
//! - **Primary** (OMDb): full film record, required to add a new film
//! - **Secondary** (TMDB): crew credits, optional and strictly additive
//!
//! The reconciler talks to both through the traits below so that tests can
//! substitute in-memory fakes.

pub mod key_transcoder;
pub mod omdb_client;
pub mod tmdb_client;

pub use key_transcoder::{to_camel_case, transcode_keys, transcode_map};
pub use omdb_client::OmdbClient;
pub use tmdb_client::{extract_crew_fields, CrewMember, MediaKind, TmdbClient, CREW_ROLES};

use serde_json::{Map, Value};
use thiserror::Error;

/// Open mapping of provider-sourced fields
pub type Metadata = Map<String, Value>;

/// Provider client errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} credential not configured")]
    MissingCredential(&'static str),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Source of full film records for identifiers not yet in the catalog
#[async_trait::async_trait]
pub trait PrimaryProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Fetch the provider-native record for `imdb_id`
    ///
    /// Keys are returned as the provider spells them; the caller transcodes.
    ///
    /// # Errors
    /// Missing credential, transport failure, non-success status, a body
    /// reporting failure, or an unparseable body.
    async fn fetch(&self, imdb_id: &str) -> Result<Metadata, ProviderError>;
}

/// Source of additive crew fields
#[async_trait::async_trait]
pub trait SecondaryProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Whether a credential is available; lookups are skipped otherwise
    fn is_configured(&self) -> bool;

    /// Crew fields found for `imdb_id` (catalog-convention keys)
    ///
    /// Never fails: any problem is logged and yields an empty mapping.
    async fn crew_fields(&self, imdb_id: &str) -> Metadata;
}
