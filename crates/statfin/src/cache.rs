//! Table listing and metadata caching using Moka.
//!
//! Listings and metadata change rarely compared with how often the catalog is
//! browsed, so both are kept for the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tilasto_core::jsonstat::{TableMetadata, TableNode};

/// Default cache capacity per kind (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Default time-to-live (1 hour).
const DEFAULT_TTL_SECS: u64 = 3600;

/// Cache for table listings and table metadata, keyed by table path.
#[derive(Clone)]
pub struct MetadataCache {
    listings: Cache<String, Arc<Vec<TableNode>>>,
    metadata: Cache<String, Arc<TableMetadata>>,
}

impl MetadataCache {
    /// Creates a cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);
        Self {
            listings: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            metadata: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cached listing for a path.
    pub async fn listing(&self, path: &str) -> Option<Arc<Vec<TableNode>>> {
        self.listings.get(path).await
    }

    /// Stores a listing.
    pub async fn insert_listing(&self, path: &str, nodes: Arc<Vec<TableNode>>) {
        self.listings.insert(path.to_string(), nodes).await;
    }

    /// Cached metadata for a table path.
    pub async fn metadata(&self, path: &str) -> Option<Arc<TableMetadata>> {
        self.metadata.get(path).await
    }

    /// Stores table metadata.
    pub async fn insert_metadata(&self, path: &str, metadata: Arc<TableMetadata>) {
        self.metadata.insert(path.to_string(), metadata).await;
    }

    /// Drops every cached entry.
    pub fn invalidate_all(&self) {
        self.listings.invalidate_all();
        self.metadata.invalidate_all();
    }

    /// Approximate number of cached entries of both kinds.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.listings.entry_count() + self.metadata.entry_count()
    }

    /// Runs pending maintenance so counts are accurate.
    pub async fn run_pending_tasks(&self) {
        self.listings.run_pending_tasks().await;
        self.metadata.run_pending_tasks().await;
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
