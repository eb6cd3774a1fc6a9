//! Dataset records.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use tilasto_core::catalog::{Dataset, DatasetUpdate, NewDataset};

use crate::error::StoreError;
use crate::store::MemoryStore;

impl MemoryStore {
    /// Creates a dataset. Identifiers are unique.
    pub fn create_dataset(&self, input: NewDataset) -> Result<Dataset, StoreError> {
        let dataset = input.into_dataset(Utc::now())?;
        match self.tables.datasets.entry(dataset.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "dataset {} already exists",
                dataset.id
            ))),
            Entry::Vacant(slot) => {
                tracing::info!(dataset_id = %dataset.id, table = %dataset.statfin_table_id, "Created dataset");
                slot.insert(dataset.clone());
                Ok(dataset)
            }
        }
    }

    /// Looks up a dataset.
    pub fn dataset(&self, id: &str) -> Result<Dataset, StoreError> {
        self.tables
            .datasets
            .get(id)
            .map(|d| d.value().clone())
            .ok_or_else(|| StoreError::not_found("Dataset", id))
    }

    /// All datasets ordered by id.
    #[must_use]
    pub fn list_datasets(&self) -> Vec<Dataset> {
        let mut datasets: Vec<Dataset> = self
            .tables
            .datasets
            .iter()
            .map(|d| d.value().clone())
            .collect();
        datasets.sort_by(|a, b| a.id.cmp(&b.id));
        datasets
    }

    /// Applies a partial update.
    pub fn update_dataset(&self, id: &str, update: DatasetUpdate) -> Result<Dataset, StoreError> {
        let mut entry = self
            .tables
            .datasets
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Dataset", id))?;
        update.apply_to(entry.value_mut(), Utc::now())?;
        Ok(entry.value().clone())
    }

    /// Deletes a dataset together with its fetch configuration and statistics.
    pub async fn delete_dataset(&self, id: &str) -> Result<(), StoreError> {
        if self.tables.datasets.remove(id).is_none() {
            return Err(StoreError::not_found("Dataset", id));
        }
        if let Some((_, config_id)) = self.tables.config_by_dataset.remove(id) {
            self.tables.fetch_configs.remove(&config_id);
        }
        let removed = self.delete_statistics(id).await;
        tracing::info!(dataset_id = id, statistics_removed = removed, "Deleted dataset");
        Ok(())
    }
}
