//! # Film Club Common Library
//!
//! Shared code for the film club tooling including:
//! - Catalog data model (film records, club info, ratings)
//! - Catalog persistence (JSON file load/save, ordering policy)
//! - Configuration loading (TOML schema, credential validation)
//! - Common error type

pub mod catalog;
pub mod config;
pub mod error;

pub use catalog::{CatalogRecord, ClubInfo, EnrichmentStatus, RatingEntry, Score};
pub use error::{Error, Result};
