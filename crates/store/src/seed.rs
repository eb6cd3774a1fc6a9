//! Seeding the store from a JSON catalog file.
//!
//! Existing records are kept: regions and industries are upserted, while a
//! dataset or fetch configuration that already exists is skipped.

use std::path::Path;

use serde::Deserialize;
use tilasto_core::catalog::{Industry, NewDataset, NewFetchConfig, Region};

use crate::error::StoreError;
use crate::store::MemoryStore;

/// Contents of a catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    /// Region dimension rows.
    pub regions: Vec<Region>,
    /// Industry dimension rows.
    pub industries: Vec<Industry>,
    /// Datasets to register.
    pub datasets: Vec<NewDataset>,
    /// Fetch configurations, referencing datasets by id.
    pub fetch_configs: Vec<NewFetchConfig>,
}

impl CatalogSeed {
    /// Parses a catalog from JSON text.
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        serde_json::from_str(text).map_err(|e| StoreError::Seed(e.to_string()))
    }

    /// Reads and parses a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

/// What a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Regions written.
    pub regions: usize,
    /// Industries written.
    pub industries: usize,
    /// Datasets created.
    pub datasets: usize,
    /// Fetch configurations created.
    pub fetch_configs: usize,
    /// Datasets and configurations that already existed.
    pub skipped: usize,
}

impl MemoryStore {
    /// Loads a catalog into the store.
    ///
    /// Validation failures and references to unknown datasets abort the run.
    pub fn seed(&self, seed: CatalogSeed) -> Result<SeedReport, StoreError> {
        let mut report = SeedReport {
            regions: self.upsert_regions(seed.regions),
            industries: self.upsert_industries(seed.industries),
            ..SeedReport::default()
        };

        for dataset in seed.datasets {
            match self.create_dataset(dataset) {
                Ok(_) => report.datasets += 1,
                Err(StoreError::Conflict(msg)) => {
                    tracing::debug!(reason = %msg, "Dataset already seeded, skipping");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        for config in seed.fetch_configs {
            match self.create_fetch_config(config) {
                Ok(_) => report.fetch_configs += 1,
                Err(StoreError::Conflict(msg)) => {
                    tracing::debug!(reason = %msg, "Fetch config already seeded, skipping");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            regions = report.regions,
            industries = report.industries,
            datasets = report.datasets,
            fetch_configs = report.fetch_configs,
            skipped = report.skipped,
            "Catalog seeded"
        );
        Ok(report)
    }
}
