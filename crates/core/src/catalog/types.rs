//! Catalog record types.
//!
//! Regions and industries are dimension tables keyed by their official codes.
//! Statistics link to them (and to each other across datasets) through the shared
//! dimension key: year, quarter, month, region code and industry code.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use crate::dimension::{IndustryLevel, RegionLevel, TimeResolution, closed_set};

closed_set! {
    /// Outcome of the most recent fetch of a configuration.
    #[derive(Default)]
    FetchStatus {
        /// Never fetched.
        #[default]
        Pending => "pending",
        /// Last fetch succeeded.
        Success => "success",
        /// Last fetch failed.
        Failed => "failed",
    }
}

/// A Finnish administrative region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Statistics Finland region code, e.g. `091` or `MK01`.
    pub code: String,
    /// Finnish name.
    pub name_fi: String,
    /// Swedish name.
    #[serde(default)]
    pub name_sv: Option<String>,
    /// English name.
    #[serde(default)]
    pub name_en: Option<String>,
    /// Administrative level.
    pub region_level: RegionLevel,
    /// Code of the enclosing region.
    #[serde(default)]
    pub parent_code: Option<String>,
    /// GeoJSON geometry for map rendering.
    #[serde(default)]
    pub geometry_json: Option<String>,
}

/// A TOL 2008 industry classification entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    /// TOL 2008 code, e.g. `C` or `62`.
    pub code: String,
    /// Finnish name.
    pub name_fi: String,
    /// Swedish name.
    #[serde(default)]
    pub name_sv: Option<String>,
    /// English name.
    #[serde(default)]
    pub name_en: Option<String>,
    /// Classification level.
    pub level: IndustryLevel,
    /// Code of the enclosing classification entry.
    #[serde(default)]
    pub parent_code: Option<String>,
    /// Extended description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A StatFin table configured for fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Internal identifier.
    pub id: String,
    /// StatFin table path, e.g. `tyti/statfin_tyti_pxt_135y.px`.
    pub statfin_table_id: String,
    /// Finnish name.
    pub name_fi: String,
    /// Swedish name.
    pub name_sv: Option<String>,
    /// English name.
    pub name_en: Option<String>,
    /// Extended description.
    pub description: Option<String>,
    /// Link to the source table.
    pub source_url: Option<String>,
    /// Temporal granularity.
    pub time_resolution: TimeResolution,
    /// Whether the table has a region dimension.
    pub has_region_dimension: bool,
    /// Whether the table has an industry dimension.
    pub has_industry_dimension: bool,
    /// When the dataset was configured.
    pub created_at: DateTime<Utc>,
    /// Last metadata change.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDataset {
    /// Internal identifier.
    pub id: String,
    /// StatFin table path.
    pub statfin_table_id: String,
    /// Finnish name.
    pub name_fi: String,
    /// Swedish name.
    #[serde(default)]
    pub name_sv: Option<String>,
    /// English name.
    #[serde(default)]
    pub name_en: Option<String>,
    /// Extended description.
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the source table.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Temporal granularity.
    #[serde(default)]
    pub time_resolution: TimeResolution,
    /// Whether the table has a region dimension.
    #[serde(default)]
    pub has_region_dimension: bool,
    /// Whether the table has an industry dimension.
    #[serde(default)]
    pub has_industry_dimension: bool,
}

impl NewDataset {
    /// Checks required fields.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::EmptyDatasetId);
        }
        if self.statfin_table_id.trim().is_empty() {
            return Err(CatalogError::EmptyTableId);
        }
        if self.name_fi.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        Ok(())
    }

    /// Validates and builds the record.
    pub fn into_dataset(self, now: DateTime<Utc>) -> Result<Dataset, CatalogError> {
        self.validate()?;
        Ok(Dataset {
            id: self.id,
            statfin_table_id: self.statfin_table_id,
            name_fi: self.name_fi,
            name_sv: self.name_sv,
            name_en: self.name_en,
            description: self.description,
            source_url: self.source_url,
            time_resolution: self.time_resolution,
            has_region_dimension: self.has_region_dimension,
            has_industry_dimension: self.has_industry_dimension,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of a [`Dataset`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetUpdate {
    /// Finnish name.
    pub name_fi: Option<String>,
    /// Swedish name.
    pub name_sv: Option<String>,
    /// English name.
    pub name_en: Option<String>,
    /// Extended description.
    pub description: Option<String>,
    /// Link to the source table.
    pub source_url: Option<String>,
    /// Temporal granularity.
    pub time_resolution: Option<TimeResolution>,
    /// Whether the table has a region dimension.
    pub has_region_dimension: Option<bool>,
    /// Whether the table has an industry dimension.
    pub has_industry_dimension: Option<bool>,
}

impl DatasetUpdate {
    /// Validates and writes the present fields over `dataset`.
    pub fn apply_to(self, dataset: &mut Dataset, now: DateTime<Utc>) -> Result<(), CatalogError> {
        if let Some(name) = self.name_fi {
            if name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            dataset.name_fi = name;
        }
        if let Some(v) = self.name_sv {
            dataset.name_sv = Some(v);
        }
        if let Some(v) = self.name_en {
            dataset.name_en = Some(v);
        }
        if let Some(v) = self.description {
            dataset.description = Some(v);
        }
        if let Some(v) = self.source_url {
            dataset.source_url = Some(v);
        }
        if let Some(v) = self.time_resolution {
            dataset.time_resolution = v;
        }
        if let Some(v) = self.has_region_dimension {
            dataset.has_region_dimension = v;
        }
        if let Some(v) = self.has_industry_dimension {
            dataset.has_industry_dimension = v;
        }
        dataset.updated_at = now;
        Ok(())
    }
}

/// A single statistic value at one point of the dimension key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    /// Store-assigned identifier, increasing with insertion order.
    pub id: i64,
    /// Parent dataset.
    pub dataset_id: String,
    /// Year, required for every row.
    pub year: i32,
    /// Quarter (1-4) for quarterly data.
    pub quarter: Option<i32>,
    /// Month (1-12) for monthly data.
    pub month: Option<i32>,
    /// Region code.
    pub region_code: Option<String>,
    /// Industry code.
    pub industry_code: Option<String>,
    /// The value. Missing when StatFin reports no figure.
    pub value: Option<Decimal>,
    /// Measure label.
    pub value_label: Option<String>,
    /// Unit of measurement.
    pub unit: Option<String>,
    /// Quality flag.
    pub data_quality: Option<String>,
    /// When the value was fetched.
    pub fetched_at: DateTime<Utc>,
}

/// A statistic row before the store assigns its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStatistic {
    /// Parent dataset.
    pub dataset_id: String,
    /// Year.
    pub year: i32,
    /// Quarter.
    pub quarter: Option<i32>,
    /// Month.
    pub month: Option<i32>,
    /// Region code.
    pub region_code: Option<String>,
    /// Industry code.
    pub industry_code: Option<String>,
    /// The value.
    pub value: Option<Decimal>,
    /// Measure label.
    pub value_label: Option<String>,
    /// Unit of measurement.
    pub unit: Option<String>,
    /// Quality flag.
    pub data_quality: Option<String>,
    /// When the value was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl NewStatistic {
    /// Assigns an identifier.
    #[must_use]
    pub fn with_id(self, id: i64) -> Statistic {
        Statistic {
            id,
            dataset_id: self.dataset_id,
            year: self.year,
            quarter: self.quarter,
            month: self.month,
            region_code: self.region_code,
            industry_code: self.industry_code,
            value: self.value,
            value_label: self.value_label,
            unit: self.unit,
            data_quality: self.data_quality,
            fetched_at: self.fetched_at,
        }
    }
}

/// Fetch schedule and last outcome for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Store-assigned identifier.
    pub id: i64,
    /// Dataset to fetch. At most one configuration per dataset.
    pub dataset_id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Inactive configurations are never scheduled.
    pub is_active: bool,
    /// Hours between fetches, at least 1.
    pub fetch_interval_hours: u32,
    /// Higher runs first.
    pub priority: i32,
    /// When the last fetch attempt finished.
    pub last_fetch_at: Option<DateTime<Utc>>,
    /// Outcome of the last fetch attempt.
    pub last_fetch_status: FetchStatus,
    /// Error message of the last failed attempt.
    pub last_error_message: Option<String>,
    /// When the next fetch is due. `None` means as soon as possible.
    pub next_fetch_at: Option<DateTime<Utc>>,
    /// Successful fetch count.
    pub fetch_count: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

const fn default_interval() -> u32 {
    24
}

const fn default_active() -> bool {
    true
}

/// Input for creating a [`FetchConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFetchConfig {
    /// Dataset to fetch.
    pub dataset_id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the configuration is scheduled.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Hours between fetches.
    #[serde(default = "default_interval")]
    pub fetch_interval_hours: u32,
    /// Higher runs first.
    #[serde(default)]
    pub priority: i32,
}

impl NewFetchConfig {
    /// Creates an active daily configuration with priority 0.
    #[must_use]
    pub fn new(dataset_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            name: name.into(),
            description: None,
            is_active: true,
            fetch_interval_hours: default_interval(),
            priority: 0,
        }
    }

    /// Checks name and interval.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.dataset_id.trim().is_empty() {
            return Err(CatalogError::EmptyDatasetId);
        }
        validate_name(&self.name)?;
        validate_interval(self.fetch_interval_hours)
    }

    /// Validates and builds a pending configuration due immediately.
    pub fn into_config(self, id: i64, now: DateTime<Utc>) -> Result<FetchConfig, CatalogError> {
        self.validate()?;
        Ok(FetchConfig {
            id,
            dataset_id: self.dataset_id,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            fetch_interval_hours: self.fetch_interval_hours,
            priority: self.priority,
            last_fetch_at: None,
            last_fetch_status: FetchStatus::Pending,
            last_error_message: None,
            next_fetch_at: None,
            fetch_count: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of a [`FetchConfig`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfigUpdate {
    /// Display name.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Whether the configuration is scheduled.
    pub is_active: Option<bool>,
    /// Hours between fetches.
    pub fetch_interval_hours: Option<u32>,
    /// Higher runs first.
    pub priority: Option<i32>,
}

impl FetchConfigUpdate {
    /// Checks the present fields.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(hours) = self.fetch_interval_hours {
            validate_interval(hours)?;
        }
        Ok(())
    }

    /// Validates and writes the present fields over `config`.
    pub fn apply_to(self, config: &mut FetchConfig, now: DateTime<Utc>) -> Result<(), CatalogError> {
        self.validate()?;
        if let Some(v) = self.name {
            config.name = v;
        }
        if let Some(v) = self.description {
            config.description = Some(v);
        }
        if let Some(v) = self.is_active {
            config.is_active = v;
        }
        if let Some(v) = self.fetch_interval_hours {
            config.fetch_interval_hours = v;
        }
        if let Some(v) = self.priority {
            config.priority = v;
        }
        config.updated_at = now;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        Err(CatalogError::EmptyName)
    } else {
        Ok(())
    }
}

/// Longest accepted fetch interval: ten years.
pub const MAX_FETCH_INTERVAL_HOURS: u32 = 24 * 366 * 10;

fn validate_interval(hours: u32) -> Result<(), CatalogError> {
    if !(1..=MAX_FETCH_INTERVAL_HOURS).contains(&hours) {
        Err(CatalogError::InvalidInterval(hours))
    } else {
        Ok(())
    }
}
