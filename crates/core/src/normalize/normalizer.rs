//! Dimension role detection and data point normalization.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::codes::{normalize_industry_code, normalize_region_code, parse_time_code};
use crate::catalog::NewStatistic;
use crate::jsonstat::{DataPoint, JsonStatDataset, ParsedDimension};

/// What a dimension encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionRole {
    /// Year, quarter or month.
    Time,
    /// Geography.
    Region,
    /// Industry classification.
    Industry,
    /// The measure ("Tiedot").
    Value,
}

impl DimensionRole {
    /// Roles in matching priority order.
    pub const PRIORITY: [Self; 4] = [Self::Time, Self::Region, Self::Industry, Self::Value];

    /// Dimension names that identify this role.
    #[must_use]
    pub const fn known_names(&self) -> &'static [&'static str] {
        match self {
            Self::Time => &["Vuosi", "Year", "Kuukausi", "Month", "Vuosineljännes", "Quarter"],
            Self::Region => &["Alue", "Region", "Maakunta", "Kunta", "Seutukunta"],
            Self::Industry => &["Toimiala", "Industry", "TOL"],
            Self::Value => &["Tiedot", "Tieto", "Information", "Data"],
        }
    }

    /// Dimension ids tried when no dimension was identified for this role.
    const fn fallback_ids(&self) -> &'static [&'static str] {
        match self {
            Self::Time => &["Vuosi", "Year"],
            Self::Region => &["Alue", "Region", "Maakunta", "Kunta"],
            Self::Industry => &["Toimiala", "Industry"],
            Self::Value => &["Tiedot", "Information"],
        }
    }

    /// Returns the first role whose known names occur in the dimension id or label.
    #[must_use]
    pub fn classify(dimension: &ParsedDimension) -> Option<Self> {
        let id = dimension.id.to_uppercase();
        let label = dimension.label.to_uppercase();
        Self::PRIORITY.into_iter().find(|role| {
            role.known_names().iter().any(|name| {
                let name = name.to_uppercase();
                id.contains(&name) || label.contains(&name)
            })
        })
    }
}

/// Dimension id assigned to each role in one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionRoles {
    /// Time dimension.
    pub time: Option<String>,
    /// Region dimension.
    pub region: Option<String>,
    /// Industry dimension.
    pub industry: Option<String>,
    /// Value dimension.
    pub value: Option<String>,
}

impl DimensionRoles {
    /// Classifies every dimension. When several match a role the last one wins.
    #[must_use]
    pub fn identify(dataset: &JsonStatDataset) -> Self {
        let mut roles = Self::default();
        for dim in &dataset.dimensions {
            let Some(role) = DimensionRole::classify(dim) else {
                continue;
            };
            tracing::debug!(dimension = %dim.id, ?role, "identified dimension role");
            *roles.slot(role) = Some(dim.id.clone());
        }
        roles
    }

    /// The dimension id for a role.
    #[must_use]
    pub fn get(&self, role: DimensionRole) -> Option<&str> {
        match role {
            DimensionRole::Time => self.time.as_deref(),
            DimensionRole::Region => self.region.as_deref(),
            DimensionRole::Industry => self.industry.as_deref(),
            DimensionRole::Value => self.value.as_deref(),
        }
    }

    fn slot(&mut self, role: DimensionRole) -> &mut Option<String> {
        match role {
            DimensionRole::Time => &mut self.time,
            DimensionRole::Region => &mut self.region,
            DimensionRole::Industry => &mut self.industry,
            DimensionRole::Value => &mut self.value,
        }
    }

    /// Looks up a role in a coordinate map, falling back to well-known ids.
    fn lookup<'a>(&self, role: DimensionRole, map: &'a BTreeMap<String, String>) -> Option<&'a str> {
        self.get(role)
            .and_then(|id| map.get(id))
            .or_else(|| role.fallback_ids().iter().find_map(|id| map.get(*id)))
            .map(String::as_str)
    }
}

/// A cell mapped onto the common dimension key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Year.
    pub year: i32,
    /// Quarter.
    pub quarter: Option<i32>,
    /// Month.
    pub month: Option<i32>,
    /// Normalized region code.
    pub region_code: Option<String>,
    /// Normalized industry code.
    pub industry_code: Option<String>,
    /// The value.
    pub value: Option<Decimal>,
    /// Label of the value dimension category.
    pub value_label: Option<String>,
    /// Unit of measurement.
    pub unit: Option<String>,
}

impl NormalizedRecord {
    /// Attaches the dataset and fetch time.
    #[must_use]
    pub fn into_statistic(self, dataset_id: &str, fetched_at: DateTime<Utc>) -> NewStatistic {
        NewStatistic {
            dataset_id: dataset_id.to_string(),
            year: self.year,
            quarter: self.quarter,
            month: self.month,
            region_code: self.region_code,
            industry_code: self.industry_code,
            value: self.value,
            value_label: self.value_label,
            unit: self.unit,
            data_quality: None,
            fetched_at,
        }
    }
}

/// Maps the cells of one dataset onto [`NormalizedRecord`]s.
#[derive(Debug, Clone)]
pub struct DataNormalizer {
    roles: DimensionRoles,
}

impl DataNormalizer {
    /// Identifies the dimension roles of `dataset`.
    #[must_use]
    pub fn for_dataset(dataset: &JsonStatDataset) -> Self {
        Self {
            roles: DimensionRoles::identify(dataset),
        }
    }

    /// Normalizes every cell. Cells without a resolvable year are dropped.
    #[must_use]
    pub fn normalize(dataset: &JsonStatDataset) -> Vec<NormalizedRecord> {
        let normalizer = Self::for_dataset(dataset);
        let points = dataset.data_points();
        let records: Vec<NormalizedRecord> = points
            .iter()
            .filter_map(|dp| normalizer.normalize_point(dp))
            .collect();

        tracing::info!(
            normalized = records.len(),
            total = points.len(),
            "normalized data points"
        );
        records
    }

    /// Normalizes one cell.
    #[must_use]
    pub fn normalize_point(&self, point: &DataPoint) -> Option<NormalizedRecord> {
        let Some(time_code) = self.roles.lookup(DimensionRole::Time, &point.coordinates) else {
            tracing::warn!(coordinates = ?point.coordinates, "could not determine year for data point");
            return None;
        };
        let period = match parse_time_code(time_code) {
            Ok(period) => period,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse time code");
                return None;
            }
        };

        Some(NormalizedRecord {
            year: period.year,
            quarter: period.quarter,
            month: period.month,
            region_code: self
                .roles
                .lookup(DimensionRole::Region, &point.coordinates)
                .map(normalize_region_code),
            industry_code: self
                .roles
                .lookup(DimensionRole::Industry, &point.coordinates)
                .map(normalize_industry_code),
            value: point.value,
            value_label: self
                .roles
                .lookup(DimensionRole::Value, &point.labels)
                .map(String::from),
            unit: None,
        })
    }
}
