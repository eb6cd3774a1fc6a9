//! The shared store handle.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use tilasto_core::catalog::{Dataset, FetchConfig, Industry, NewStatistic, Region, Statistic};
use tokio::sync::RwLock;

/// Natural key of a statistics row: one value per dataset, period, dimension and label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct StatisticKey {
    dataset_id: String,
    year: i32,
    quarter: Option<i32>,
    month: Option<i32>,
    region_code: Option<String>,
    industry_code: Option<String>,
    value_label: Option<String>,
}

impl StatisticKey {
    pub(crate) fn of(stat: &NewStatistic) -> Self {
        Self {
            dataset_id: stat.dataset_id.clone(),
            year: stat.year,
            quarter: stat.quarter,
            month: stat.month,
            region_code: stat.region_code.clone(),
            industry_code: stat.industry_code.clone(),
            value_label: stat.value_label.clone(),
        }
    }

    pub(crate) fn of_row(stat: &Statistic) -> Self {
        Self {
            dataset_id: stat.dataset_id.clone(),
            year: stat.year,
            quarter: stat.quarter,
            month: stat.month,
            region_code: stat.region_code.clone(),
            industry_code: stat.industry_code.clone(),
            value_label: stat.value_label.clone(),
        }
    }
}

/// Statistics rows with their natural-key index and identifier sequence.
#[derive(Debug)]
pub(crate) struct StatisticTable {
    pub(crate) rows: Vec<Statistic>,
    /// natural key -> position in `rows`
    pub(crate) index: HashMap<StatisticKey, usize>,
    pub(crate) next_id: i64,
}

impl StatisticTable {
    pub(crate) fn reindex(&mut self) {
        self.index = self
            .rows
            .iter()
            .enumerate()
            .map(|(pos, row)| (StatisticKey::of_row(row), pos))
            .collect();
    }
}

#[derive(Debug)]
pub(crate) struct Tables {
    pub(crate) regions: DashMap<String, Region>,
    pub(crate) industries: DashMap<String, Industry>,
    pub(crate) datasets: DashMap<String, Dataset>,
    pub(crate) fetch_configs: DashMap<i64, FetchConfig>,
    /// dataset id -> fetch config id
    pub(crate) config_by_dataset: DashMap<String, i64>,
    pub(crate) next_config_id: AtomicI64,
    pub(crate) statistics: RwLock<StatisticTable>,
}

/// In-memory store. Cloning yields another handle to the same data.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub(crate) tables: Arc<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Tables {
                regions: DashMap::new(),
                industries: DashMap::new(),
                datasets: DashMap::new(),
                fetch_configs: DashMap::new(),
                config_by_dataset: DashMap::new(),
                next_config_id: AtomicI64::new(1),
                statistics: RwLock::new(StatisticTable {
                    rows: Vec::new(),
                    index: HashMap::new(),
                    next_id: 1,
                }),
            }),
        }
    }

    pub(crate) fn next_config_id(&self) -> i64 {
        self.tables.next_config_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
