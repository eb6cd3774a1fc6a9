//! Discrete user actions over the filter state.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::state::PartialFilterState;
use crate::dimension::{IndustryLevel, RegionLevel, TimeResolution};

/// A filter change requested by the user.
///
/// Serialized as an adjacently tagged event, e.g.
/// `{"type": "SET_YEAR_RANGE", "payload": {"from": 2020, "to": 2025}}`.
/// Event types this build does not know deserialize to [`FilterAction::Unknown`],
/// whatever payload they carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterAction {
    /// Set or clear the exact year.
    SetYear(Option<i32>),
    /// Set the year range. Clears the exact year.
    SetYearRange {
        /// Lower bound.
        from: Option<i32>,
        /// Upper bound.
        to: Option<i32>,
    },
    /// Set or clear the quarter.
    SetQuarter(Option<i32>),
    /// Set or clear the month.
    SetMonth(Option<i32>),
    /// Change the time resolution, clearing selections finer than it.
    SetTimeResolution(TimeResolution),
    /// Set or clear the region code.
    SetRegionCode(Option<String>),
    /// Set or clear the region level.
    SetRegionLevel(Option<RegionLevel>),
    /// Set region code and level together.
    SetRegion {
        /// Region code, `None` when only the level changes.
        code: Option<String>,
        /// Region level.
        level: Option<RegionLevel>,
    },
    /// Set or clear the industry code.
    SetIndustryCode(Option<String>),
    /// Set or clear the industry level.
    SetIndustryLevel(Option<IndustryLevel>),
    /// Set industry code and level together.
    SetIndustry {
        /// Industry code, `None` when only the level changes.
        code: Option<String>,
        /// Industry level.
        level: Option<IndustryLevel>,
    },
    /// Set or clear the primary dataset.
    SetDatasetId(Option<String>),
    /// Replace the comparison list. The caller de-duplicates.
    SetDatasetIds(Vec<String>),
    /// Append a dataset to the comparison list unless already present.
    AddDatasetId(String),
    /// Remove a dataset from the comparison list.
    RemoveDatasetId(String),
    /// Set or clear the value label.
    SetValueLabel(Option<String>),
    /// Shallow-merge a partial state.
    SetFilters(PartialFilterState),
    /// Return to the canonical default state.
    ResetFilters,
    /// Clear every time selection and reset the resolution.
    ResetTimeFilters,
    /// Clear region code and level.
    ResetGeographicFilters,
    /// Clear industry code and level.
    ResetIndustryFilters,
    /// An action kind this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl FilterAction {
    /// Returns the event type name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetYear(_) => "SET_YEAR",
            Self::SetYearRange { .. } => "SET_YEAR_RANGE",
            Self::SetQuarter(_) => "SET_QUARTER",
            Self::SetMonth(_) => "SET_MONTH",
            Self::SetTimeResolution(_) => "SET_TIME_RESOLUTION",
            Self::SetRegionCode(_) => "SET_REGION_CODE",
            Self::SetRegionLevel(_) => "SET_REGION_LEVEL",
            Self::SetRegion { .. } => "SET_REGION",
            Self::SetIndustryCode(_) => "SET_INDUSTRY_CODE",
            Self::SetIndustryLevel(_) => "SET_INDUSTRY_LEVEL",
            Self::SetIndustry { .. } => "SET_INDUSTRY",
            Self::SetDatasetId(_) => "SET_DATASET_ID",
            Self::SetDatasetIds(_) => "SET_DATASET_IDS",
            Self::AddDatasetId(_) => "ADD_DATASET_ID",
            Self::RemoveDatasetId(_) => "REMOVE_DATASET_ID",
            Self::SetValueLabel(_) => "SET_VALUE_LABEL",
            Self::SetFilters(_) => "SET_FILTERS",
            Self::ResetFilters => "RESET_FILTERS",
            Self::ResetTimeFilters => "RESET_TIME_FILTERS",
            Self::ResetGeographicFilters => "RESET_GEOGRAPHIC_FILTERS",
            Self::ResetIndustryFilters => "RESET_INDUSTRY_FILTERS",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Serialize for FilterAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Self::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for FilterAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let event = Value::deserialize(deserializer)?;
        // Resolve the tag alone first so unknown kinds skip payload decoding
        if let Some(kind) = event.get("type").cloned() {
            let tag_only = Value::Object([("type".to_string(), kind)].into_iter().collect());
            if matches!(Self::deserialize(tag_only), Ok(Self::Unknown)) {
                if let Some(kind) = event.get("type").and_then(Value::as_str) {
                    tracing::debug!(kind, "ignoring unknown filter action");
                }
                return Ok(Self::Unknown);
            }
        }
        Self::deserialize(event).map_err(D::Error::custom)
    }
}
