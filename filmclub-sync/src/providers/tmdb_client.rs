//! TMDB API client (secondary provider)
//!
//! Crew enrichment is a two-step lookup:
//! 1. `/find/{imdb_id}?external_source=imdb_id` resolves the IMDb id to a
//!    TMDB id and media kind (movie first, tv as fallback)
//! 2. `/{kind}/{tmdb_id}/credits` lists the crew, from which a fixed table of
//!    jobs is copied into catalog fields
//!
//! Every failure degrades to "no enrichment data".

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use super::{Metadata, ProviderError, SecondaryProvider};

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Crew job → catalog field
pub const CREW_ROLES: &[(&str, &str)] = &[
    ("Director of Photography", "cinematographer"),
    ("Original Music Composer", "composer"),
    ("Editor", "editor"),
    ("Production Design", "productionDesigner"),
    ("Costume Design", "costumeDesigner"),
];

/// TMDB media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    fn path_segment(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// `/find` response
#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    movie_results: Vec<FindResult>,
    #[serde(default)]
    tv_results: Vec<FindResult>,
}

#[derive(Debug, Deserialize)]
struct FindResult {
    id: u64,
}

/// `/credits` response
#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    crew: Vec<CrewMember>,
}

/// One crew credit
#[derive(Debug, Clone, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
}

/// Map crew credits onto catalog fields
///
/// Several people in one role are joined sorted and deduplicated with
/// `", "`. Roles nobody holds are absent from the result.
pub fn extract_crew_fields(crew: &[CrewMember]) -> Metadata {
    let mut names_by_field: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for member in crew {
        let name = member.name.trim();
        if name.is_empty() {
            continue;
        }
        let job = member.job.trim();
        if let Some((_, field)) = CREW_ROLES
            .iter()
            .find(|(role, _)| role.eq_ignore_ascii_case(job))
        {
            names_by_field.entry(*field).or_default().insert(name);
        }
    }

    names_by_field
        .into_iter()
        .map(|(field, names)| {
            let joined = names.into_iter().collect::<Vec<_>>().join(", ");
            (field.to_string(), Value::String(joined))
        })
        .collect()
}

/// TMDB API client
pub struct TmdbClient {
    http_client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl TmdbClient {
    /// Create a client; `api_token` of `None` disables lookups
    pub fn new(api_token: Option<String>, user_agent: &str) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: TMDB_BASE_URL.to_string(),
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Point the client at a different server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Resolve and fetch crew fields
    ///
    /// `Ok` with an empty mapping when the id resolves to nothing.
    pub async fn lookup_crew(&self, imdb_id: &str) -> Result<Metadata, ProviderError> {
        let token = self
            .api_token
            .as_deref()
            .ok_or(ProviderError::MissingCredential("TMDB"))?;

        let Some((tmdb_id, kind)) = self.resolve(imdb_id, token).await? else {
            tracing::info!(imdb_id = %imdb_id, "No TMDB match for IMDb id");
            return Ok(Metadata::new());
        };

        let crew = self.credits(tmdb_id, kind, token).await?;
        let fields = extract_crew_fields(&crew);

        tracing::info!(
            imdb_id = %imdb_id,
            tmdb_id,
            kind = %kind,
            fields = fields.len(),
            "Retrieved crew from TMDB"
        );

        Ok(fields)
    }

    async fn resolve(
        &self,
        imdb_id: &str,
        token: &str,
    ) -> Result<Option<(u64, MediaKind)>, ProviderError> {
        let url = self.endpoint(&["find", imdb_id])?;
        tracing::debug!(imdb_id = %imdb_id, "Resolving IMDb id via TMDB");

        let found: FindResponse = self
            .get_json(url, &[("external_source", "imdb_id")], token)
            .await?;

        if let Some(movie) = found.movie_results.first() {
            return Ok(Some((movie.id, MediaKind::Movie)));
        }
        if let Some(show) = found.tv_results.first() {
            tracing::info!(imdb_id = %imdb_id, tmdb_id = show.id, "No TMDB movie match, using tv result");
            return Ok(Some((show.id, MediaKind::Tv)));
        }
        Ok(None)
    }

    async fn credits(
        &self,
        tmdb_id: u64,
        kind: MediaKind,
        token: &str,
    ) -> Result<Vec<CrewMember>, ProviderError> {
        let tmdb_id = tmdb_id.to_string();
        let url = self.endpoint(&[kind.path_segment(), &tmdb_id, "credits"])?;
        let credits: CreditsResponse = self.get_json(url, &[], token).await?;
        Ok(credits.crew)
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::ParseError(format!("Invalid TMDB base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::ParseError(format!("TMDB base URL takes no path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .http_client
            .get(url.as_str())
            .query(query)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Err(ProviderError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl SecondaryProvider for TmdbClient {
    fn name(&self) -> &'static str {
        "TMDB"
    }

    fn is_configured(&self) -> bool {
        self.api_token.is_some()
    }

    async fn crew_fields(&self, imdb_id: &str) -> Metadata {
        match self.lookup_crew(imdb_id).await {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(imdb_id = %imdb_id, error = %e, "TMDB enrichment unavailable");
                Metadata::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn crew(name: &str, job: &str) -> CrewMember {
        CrewMember {
            name: name.to_string(),
            job: job.to_string(),
        }
    }

    #[test]
    fn test_extract_maps_fixed_roles() {
        let fields = extract_crew_fields(&[
            crew("Roger Deakins", "Director of Photography"),
            crew("Joel Coen", "Director"),
            crew("Carter Burwell", "Original Music Composer"),
        ]);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["cinematographer"], json!("Roger Deakins"));
        assert_eq!(fields["composer"], json!("Carter Burwell"));
    }

    #[test]
    fn test_extract_joins_sorted_unique() {
        let fields = extract_crew_fields(&[
            crew("Roderick Jaynes", "Editor"),
            crew("Ethan Coen", "Editor"),
            crew("Roderick Jaynes", "Editor"),
            crew("  ", "Editor"),
        ]);

        assert_eq!(fields["editor"], json!("Ethan Coen, Roderick Jaynes"));
    }

    #[test]
    fn test_extract_empty_crew() {
        assert!(extract_crew_fields(&[]).is_empty());
    }

    #[test]
    fn test_unconfigured_without_token() {
        assert!(!TmdbClient::new(None, "ua").unwrap().is_configured());
        assert!(!TmdbClient::new(Some(" ".to_string()), "ua").unwrap().is_configured());
        assert!(TmdbClient::new(Some("t".to_string()), "ua").unwrap().is_configured());
    }

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let client = TmdbClient::new(Some("t".to_string()), "ua").unwrap();

        let url = client.endpoint(&["find", "tt1/../x?y#z"]).unwrap();
        assert_eq!(url.path(), "/3/find/tt1%2F..%2Fx%3Fy%23z");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = client.endpoint(&["movie", "275", "credits"]).unwrap();
        assert_eq!(url.as_str(), "https://api.themoviedb.org/3/movie/275/credits");
    }

    #[test]
    fn test_endpoint_on_bare_host() {
        let client = TmdbClient::new(Some("t".to_string()), "ua")
            .unwrap()
            .with_base_url("http://127.0.0.1:9/");
        let url = client.endpoint(&["find", "tt1"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/find/tt1");
    }

    #[tokio::test]
    async fn test_crew_fields_degrade_without_token() {
        let client = TmdbClient::new(None, "ua").unwrap();
        assert!(client.crew_fields("tt0116282").await.is_empty());
    }
}
