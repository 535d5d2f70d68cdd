//! Film catalog model and persistence

pub mod models;
pub mod ordering;
pub mod store;

pub use models::*;
pub use ordering::{parse_watch_date, CatalogOrder};
pub use store::{load_catalog, parse_catalog, render_catalog, save_catalog};
