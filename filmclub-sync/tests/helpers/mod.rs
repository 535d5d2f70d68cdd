//! Shared fixtures for filmclub-sync integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use filmclub_sync::providers::{Metadata, PrimaryProvider, ProviderError, SecondaryProvider};
use filmclub_sync::sheet::SheetRow;
use filmclub_sync::RecordReconciler;
use serde_json::{json, Value};

/// In-memory primary provider keyed by IMDb id
#[derive(Default)]
pub struct FakePrimary {
    films: HashMap<String, Metadata>,
    calls: AtomicUsize,
}

impl FakePrimary {
    pub fn with_film(mut self, imdb_id: &str, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.films.insert(imdb_id.to_string(), map);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrimaryProvider for FakePrimary {
    fn name(&self) -> &'static str {
        "fake-primary"
    }

    async fn fetch(&self, imdb_id: &str) -> Result<Metadata, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.films
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("{}: Incorrect IMDb ID.", imdb_id)))
    }
}

/// In-memory secondary provider, unconfigured unless built with `configured()`
#[derive(Default)]
pub struct FakeSecondary {
    configured: bool,
    crew: HashMap<String, Metadata>,
    calls: AtomicUsize,
}

impl FakeSecondary {
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Default::default()
        }
    }

    pub fn with_crew(mut self, imdb_id: &str, fields: Value) -> Self {
        if let Value::Object(map) = fields {
            self.crew.insert(imdb_id.to_string(), map);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecondaryProvider for FakeSecondary {
    fn name(&self) -> &'static str {
        "fake-secondary"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn crew_fields(&self, imdb_id: &str) -> Metadata {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.crew.get(imdb_id).cloned().unwrap_or_default()
    }
}

pub fn roster() -> Vec<String> {
    ["andy", "gabe", "jacob", "joey", "greg"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

pub fn reconciler(
    primary: &Arc<FakePrimary>,
    secondary: &Arc<FakeSecondary>,
) -> RecordReconciler {
    RecordReconciler::new(primary.clone(), secondary.clone(), roster())
}

/// Row from (column, value) pairs
pub fn row(pairs: &[(&str, &str)]) -> SheetRow {
    SheetRow::from_pairs(pairs.iter().copied())
}

/// OMDb-style body for a film
pub fn omdb_body(imdb_id: &str, title: &str) -> Value {
    json!({
        "Title": title,
        "Year": "1979",
        "Director": "Ridley Scott",
        "imdbID": imdb_id,
        "BoxOffice": "$81,900,208",
        "Ratings": [{"Source": "Internet Movie Database", "Value": "8.5/10"}],
        "Response": "True"
    })
}
