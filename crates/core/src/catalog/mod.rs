//! Catalog records: dimension tables, datasets, statistics and fetch configurations.

pub mod error;
pub mod types;


pub use error::CatalogError;
pub use types::{
    Dataset, DatasetUpdate, FetchConfig, FetchConfigUpdate, FetchStatus, Industry, NewDataset,
    NewFetchConfig, NewStatistic, Region, Statistic, MAX_FETCH_INTERVAL_HOURS,
};
