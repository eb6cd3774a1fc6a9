//! In-memory catalog and statistics store for Tilasto.
//!
//! Holds the dimension tables, datasets, fetch configurations and fetched
//! statistics, and answers filtered statistics queries.
//!
//! # Modules
//!
//! - `store` - The shared `MemoryStore` handle
//! - `dimension` - Regions and industries
//! - `dataset` - Dataset CRUD
//! - `fetch_config` - Fetch configuration CRUD, one per dataset
//! - `statistic` - Bulk upsert and filtered queries
//! - `seed` - Loading a JSON catalog

pub mod dataset;
pub mod dimension;
pub mod error;
pub mod fetch_config;
pub mod seed;
pub mod statistic;
pub mod store;

pub use error::StoreError;
pub use seed::{CatalogSeed, SeedReport};
pub use statistic::UpsertOutcome;
pub use store::MemoryStore;
