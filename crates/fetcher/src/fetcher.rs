//! Dataset fetch orchestration.
//!
//! One fetch loads the dataset and its configuration, queries StatFin, maps the
//! JSON-stat cells onto statistics rows, upserts them and records the outcome on
//! the fetch configuration.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tilasto_core::catalog::{Dataset, NewStatistic};
use tilasto_core::jsonstat::PxQuery;
use tilasto_core::normalize::{DataNormalizer, NormalizedRecord};
use tilasto_core::schedule::{FetchResult, ScheduleService};
use tilasto_shared::config::WorkerConfig;
use tilasto_statfin::StatFinSource;
use tilasto_store::MemoryStore;
use tokio::sync::Semaphore;

use crate::error::FetchError;

/// Default number of datasets fetched at the same time.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Default pause between consecutive fetches of a run.
pub const DEFAULT_MIN_FETCH_DELAY: Duration = Duration::from_secs(1);

/// Concurrency and pacing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherOptions {
    /// Maximum datasets fetched at the same time.
    pub max_concurrent: usize,
    /// Pause between consecutive fetches of a run.
    pub min_fetch_delay: Duration,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            min_fetch_delay: DEFAULT_MIN_FETCH_DELAY,
        }
    }
}

impl FetcherOptions {
    /// Reads the worker section of the configuration.
    #[must_use]
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent.max(1),
            min_fetch_delay: Duration::from_millis(config.min_fetch_delay_ms),
        }
    }
}

/// Rows ready for storage plus the problems found while preparing them.
struct Prepared {
    rows: Vec<NewStatistic>,
    warnings: Vec<String>,
}

/// Fetches datasets from a [`StatFinSource`] into a [`MemoryStore`].
pub struct DataFetcher<S> {
    source: Arc<S>,
    store: MemoryStore,
    semaphore: Arc<Semaphore>,
    options: FetcherOptions,
}

impl<S> std::fmt::Debug for DataFetcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFetcher")
            .field("options", &self.options)
            .field("available_permits", &self.semaphore.available_permits())
            .finish_non_exhaustive()
    }
}

impl<S: StatFinSource> DataFetcher<S> {
    /// Creates a fetcher.
    #[must_use]
    pub fn new(source: Arc<S>, store: MemoryStore, options: FetcherOptions) -> Self {
        let permits = options.max_concurrent.max(1);
        Self {
            source,
            store,
            semaphore: Arc::new(Semaphore::new(permits)),
            options,
        }
    }

    /// The store rows are written to.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Fetches a dataset with a select-all query.
    pub async fn fetch_dataset(&self, dataset_id: &str) -> FetchResult {
        self.fetch_dataset_with(dataset_id, None).await
    }

    /// Fetches a dataset, optionally with a custom query.
    ///
    /// Never fails: problems are reported in the returned [`FetchResult`], and on
    /// the dataset's fetch configuration when it has one.
    pub async fn fetch_dataset_with(&self, dataset_id: &str, query: Option<&PxQuery>) -> FetchResult {
        let started = Instant::now();
        let Ok(_permit) = self.semaphore.acquire().await else {
            return FetchResult::failed(dataset_id, "fetcher is shut down");
        };

        let result = match self.run_fetch(dataset_id, query).await {
            Ok(result) => result,
            Err(err) => {
                match &err {
                    FetchError::RateLimited(_) => {
                        tracing::warn!(dataset_id, error = %err, "Rate limited while fetching dataset");
                    }
                    _ => tracing::error!(dataset_id, error = %err, "Failed to fetch dataset"),
                }
                FetchResult::failed(dataset_id, err.to_string())
            }
        };
        result.with_duration(started.elapsed())
    }

    /// Fetches several datasets concurrently, bounded by `max_concurrent`.
    pub async fn fetch_datasets(&self, dataset_ids: &[String]) -> Vec<FetchResult> {
        join_all(dataset_ids.iter().map(|id| self.fetch_dataset(id))).await
    }

    /// Fetches every active configuration that is due, or all of them when forced.
    ///
    /// Runs in priority order, pausing between fetches.
    pub async fn fetch_all_active(&self, force: bool) -> Vec<FetchResult> {
        let configs = self.store.list_fetch_configs(true);
        let due = ScheduleService::due_configs(&configs, Utc::now(), force);
        if due.is_empty() {
            tracing::info!("No active fetch configurations due for fetching");
            return Vec::new();
        }

        tracing::info!(count = due.len(), force, "Found datasets to fetch");
        let mut results = Vec::with_capacity(due.len());
        for (i, config) in due.iter().enumerate() {
            if i > 0 && !self.options.min_fetch_delay.is_zero() {
                tokio::time::sleep(self.options.min_fetch_delay).await;
            }
            results.push(self.fetch_dataset(&config.dataset_id).await);
        }
        results
    }

    /// Fetches the dataset of a fetch configuration.
    pub async fn fetch_by_config_id(&self, config_id: i64) -> FetchResult {
        match self.store.fetch_config(config_id) {
            Ok(config) => self.fetch_dataset(&config.dataset_id).await,
            Err(_) => FetchResult::failed("unknown", FetchError::ConfigNotFound(config_id).to_string()),
        }
    }

    async fn run_fetch(&self, dataset_id: &str, query: Option<&PxQuery>) -> Result<FetchResult, FetchError> {
        let dataset = self
            .store
            .dataset(dataset_id)
            .map_err(|_| FetchError::DatasetNotFound(dataset_id.to_string()))?;

        tracing::info!(dataset_id, table = %dataset.statfin_table_id, "Starting fetch");

        match self.fetch_and_store(&dataset, query).await {
            Ok(result) => {
                let now = Utc::now();
                self.store
                    .record_fetch_outcome(dataset_id, |c| ScheduleService::record_success(c, now));
                tracing::info!(
                    dataset_id,
                    inserted = result.records_inserted,
                    updated = result.records_updated,
                    skipped = result.records_skipped,
                    "Fetched dataset"
                );
                Ok(result)
            }
            Err(err) => {
                let now = Utc::now();
                let message = err.to_string();
                self.store
                    .record_fetch_outcome(dataset_id, |c| ScheduleService::record_failure(c, now, message));
                Err(err)
            }
        }
    }

    async fn fetch_and_store(&self, dataset: &Dataset, query: Option<&PxQuery>) -> Result<FetchResult, FetchError> {
        let default_query;
        let query = match query {
            Some(q) => q,
            None => {
                default_query = PxQuery::all();
                &default_query
            }
        };

        let parsed = self
            .source
            .fetch_and_parse(&dataset.statfin_table_id, query)
            .await?;
        let fetched = parsed.total_cells();
        tracing::debug!(dataset_id = %dataset.id, cells = fetched, "Received data points");

        let records = DataNormalizer::normalize(&parsed);
        let skipped = fetched.saturating_sub(records.len());
        let prepared = self.prepare(&dataset.id, records);
        let outcome = self.store.upsert_statistics(prepared.rows).await?;

        Ok(FetchResult {
            success: true,
            dataset_id: dataset.id.clone(),
            records_fetched: fetched,
            records_inserted: outcome.inserted,
            records_updated: outcome.updated,
            records_skipped: skipped,
            warnings: prepared.warnings,
            ..FetchResult::default()
        })
    }

    /// Drops region and industry codes missing from the dimension tables.
    fn prepare(&self, dataset_id: &str, records: Vec<NormalizedRecord>) -> Prepared {
        let fetched_at = Utc::now();
        let mut unknown_regions = BTreeSet::new();
        let mut unknown_industries = BTreeSet::new();

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = record.into_statistic(dataset_id, fetched_at);
                if let Some(code) = row.region_code.take_if(|c| !self.store.has_region(c)) {
                    unknown_regions.insert(code);
                }
                if let Some(code) = row.industry_code.take_if(|c| !self.store.has_industry(c)) {
                    unknown_industries.insert(code);
                }
                row
            })
            .collect();

        let warnings: Vec<String> = unknown_regions
            .into_iter()
            .map(|c| format!("Unknown region code: {c}"))
            .chain(
                unknown_industries
                    .into_iter()
                    .map(|c| format!("Unknown industry code: {c}")),
            )
            .collect();
        for warning in &warnings {
            tracing::warn!(dataset_id, "{warning}");
        }

        Prepared { rows, warnings }
    }
}
