//! Projection of the filter state onto statistics query API parameters.

use serde::{Deserialize, Serialize};

use super::state::FilterState;
use crate::dimension::{IndustryLevel, RegionLevel};

/// Query parameters for the statistics query endpoint.
///
/// Absent fields are left out of the serialized form entirely, never sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiQueryParams {
    /// Exact year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Year range lower bound, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_from: Option<i32>,
    /// Year range upper bound, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_to: Option<i32>,
    /// Quarter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<i32>,
    /// Month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    /// Region code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    /// Region level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_level: Option<RegionLevel>,
    /// Industry code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_code: Option<String>,
    /// Industry level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_level: Option<IndustryLevel>,
    /// Dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    /// Value label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_label: Option<String>,
}

impl ApiQueryParams {
    /// Returns the present parameters as name/value pairs, in a stable order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let ints = [
            ("year", self.year),
            ("year_from", self.year_from),
            ("year_to", self.year_to),
            ("quarter", self.quarter),
            ("month", self.month),
        ];
        pairs.extend(
            ints.into_iter()
                .filter_map(|(name, v)| v.map(|v| (name, v.to_string()))),
        );

        if let Some(code) = &self.region_code {
            pairs.push(("region_code", code.clone()));
        }
        if let Some(level) = self.region_level {
            pairs.push(("region_level", level.as_str().to_string()));
        }
        if let Some(code) = &self.industry_code {
            pairs.push(("industry_code", code.clone()));
        }
        if let Some(level) = self.industry_level {
            pairs.push(("industry_level", level.as_str().to_string()));
        }
        if let Some(id) = &self.dataset_id {
            pairs.push(("dataset_id", id.clone()));
        }
        if let Some(label) = &self.value_label {
            pairs.push(("value_label", label.clone()));
        }

        pairs
    }

    /// Returns true if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Maps the filter state to API parameter names.
///
/// The time resolution and the comparison dataset list have no API counterpart.
#[must_use]
pub fn to_query_params(state: &FilterState) -> ApiQueryParams {
    ApiQueryParams {
        year: state.year,
        year_from: state.year_from,
        year_to: state.year_to,
        quarter: state.quarter,
        month: state.month,
        region_code: state.region_code.clone(),
        region_level: state.region_level,
        industry_code: state.industry_code.clone(),
        industry_level: state.industry_level,
        dataset_id: state.dataset_id.clone(),
        value_label: state.value_label.clone(),
    }
}

/// Returns true if any selection narrows the data.
///
/// The time resolution does not count, even when it is not the default.
#[must_use]
pub fn has_active_filters(state: &FilterState) -> bool {
    state.year.is_some()
        || state.year_from.is_some()
        || state.year_to.is_some()
        || state.quarter.is_some()
        || state.month.is_some()
        || state.region_code.is_some()
        || state.region_level.is_some()
        || state.industry_code.is_some()
        || state.industry_level.is_some()
        || state.dataset_id.is_some()
        || state.value_label.is_some()
        || !state.dataset_ids.is_empty()
}
