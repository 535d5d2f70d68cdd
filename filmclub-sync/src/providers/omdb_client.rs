//! OMDb API client (primary provider)
//!
//! Looks a film up by IMDb id. OMDb signals lookup failure in the body
//! (`"Response": "False"` plus an `"Error"` message) as well as, for some
//! failures, through the HTTP status.

use reqwest::Client;
use serde_json::Value;

use super::{Metadata, PrimaryProvider, ProviderError};

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// Body fields describing the request outcome rather than the film
const TRANSPORT_FIELDS: &[&str] = &["Response", "Error"];

/// OMDb API client
pub struct OmdbClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    /// Create a client; `api_key` of `None` makes every lookup fail
    pub fn new(api_key: Option<String>, user_agent: &str) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: OMDB_BASE_URL.to_string(),
            api_key,
        })
    }

    /// Point the client at a different server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Lookup a film by IMDb id
    ///
    /// Returns the body with its transport fields removed; keys keep OMDb's
    /// PascalCase spelling.
    pub async fn lookup(&self, imdb_id: &str) -> Result<Metadata, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingCredential("OMDb"))?;

        tracing::debug!(imdb_id = %imdb_id, "Querying OMDb API");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("i", imdb_id), ("apikey", api_key), ("plot", "full")])
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(status.as_u16(), error_text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let Value::Object(mut record) = body else {
            return Err(ProviderError::ParseError(
                "OMDb response is not a JSON object".to_string(),
            ));
        };

        let succeeded = record
            .get("Response")
            .and_then(Value::as_str)
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if !succeeded {
            let message = record
                .get("Error")
                .and_then(Value::as_str)
                .unwrap_or("lookup failed")
                .to_string();
            return Err(ProviderError::NotFound(format!("{}: {}", imdb_id, message)));
        }

        for field in TRANSPORT_FIELDS {
            record.remove(*field);
        }

        let title = record
            .get("Title")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown");
        tracing::info!(imdb_id = %imdb_id, title = %title, "Retrieved film from OMDb");

        Ok(record)
    }
}

#[async_trait::async_trait]
impl PrimaryProvider for OmdbClient {
    fn name(&self) -> &'static str {
        "OMDb"
    }

    async fn fetch(&self, imdb_id: &str) -> Result<Metadata, ProviderError> {
        self.lookup(imdb_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OmdbClient::new(Some("key".to_string()), "test-agent");
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = OmdbClient::new(None, "test-agent")
            .unwrap()
            .with_base_url("http://127.0.0.1:9/");

        let err = client.lookup("tt0078748").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential("OMDb")));
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let client = OmdbClient::new(Some("  ".to_string()), "test-agent").unwrap();
        let err = client.lookup("tt0078748").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(_)));
    }
}
