//! Fetch configurations. A dataset has at most one.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use tilasto_core::catalog::{FetchConfig, FetchConfigUpdate, NewFetchConfig};

use crate::error::StoreError;
use crate::store::MemoryStore;

impl MemoryStore {
    /// Creates a fetch configuration for an existing dataset.
    pub fn create_fetch_config(&self, input: NewFetchConfig) -> Result<FetchConfig, StoreError> {
        input.validate()?;
        if !self.tables.datasets.contains_key(&input.dataset_id) {
            return Err(StoreError::not_found("Dataset", &input.dataset_id));
        }

        match self.tables.config_by_dataset.entry(input.dataset_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "dataset {} already has a fetch configuration",
                input.dataset_id
            ))),
            Entry::Vacant(slot) => {
                let config = input.into_config(self.next_config_id(), Utc::now())?;
                slot.insert(config.id);
                self.tables.fetch_configs.insert(config.id, config.clone());
                tracing::info!(config_id = config.id, dataset_id = %config.dataset_id, "Created fetch config");
                Ok(config)
            }
        }
    }

    /// Looks up a fetch configuration.
    pub fn fetch_config(&self, id: i64) -> Result<FetchConfig, StoreError> {
        self.tables
            .fetch_configs
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or_else(|| StoreError::not_found("Fetch config", id))
    }

    /// The fetch configuration of a dataset, if any.
    #[must_use]
    pub fn fetch_config_for_dataset(&self, dataset_id: &str) -> Option<FetchConfig> {
        let id = *self.tables.config_by_dataset.get(dataset_id)?;
        self.tables.fetch_configs.get(&id).map(|c| c.value().clone())
    }

    /// Fetch configurations ordered by id.
    #[must_use]
    pub fn list_fetch_configs(&self, active_only: bool) -> Vec<FetchConfig> {
        let mut configs: Vec<FetchConfig> = self
            .tables
            .fetch_configs
            .iter()
            .filter(|c| !active_only || c.is_active)
            .map(|c| c.value().clone())
            .collect();
        configs.sort_by_key(|c| c.id);
        configs
    }

    /// Applies a partial update.
    pub fn update_fetch_config(
        &self,
        id: i64,
        update: FetchConfigUpdate,
    ) -> Result<FetchConfig, StoreError> {
        let mut entry = self
            .tables
            .fetch_configs
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Fetch config", id))?;
        update.apply_to(entry.value_mut(), Utc::now())?;
        Ok(entry.value().clone())
    }

    /// Records a fetch outcome on a dataset's configuration in place.
    ///
    /// The change runs under the entry lock, so concurrent updates and outcomes
    /// are never overwritten. Returns the updated configuration, or `None` when
    /// the dataset has none.
    pub fn record_fetch_outcome(
        &self,
        dataset_id: &str,
        record: impl FnOnce(&mut FetchConfig),
    ) -> Option<FetchConfig> {
        let id = *self.tables.config_by_dataset.get(dataset_id)?;
        let mut entry = self.tables.fetch_configs.get_mut(&id)?;
        record(entry.value_mut());
        Some(entry.value().clone())
    }

    /// Deletes a fetch configuration.
    pub fn delete_fetch_config(&self, id: i64) -> Result<(), StoreError> {
        let (_, config) = self
            .tables
            .fetch_configs
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("Fetch config", id))?;
        self.tables.config_by_dataset.remove(&config.dataset_id);
        tracing::info!(config_id = id, dataset_id = %config.dataset_id, "Deleted fetch config");
        Ok(())
    }
}
