//! The filter record and its partial form.

use serde::{Deserialize, Serialize};

use crate::dimension::{IndustryLevel, RegionLevel, TimeResolution};

/// Current selection across every filterable axis.
///
/// `None` means "unset"; `Some(0)` is a legitimate selection distinct from unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// Exact year.
    pub year: Option<i32>,
    /// Lower bound of a year range.
    pub year_from: Option<i32>,
    /// Upper bound of a year range.
    pub year_to: Option<i32>,
    /// Quarter, expected 1-4 but not validated.
    pub quarter: Option<i32>,
    /// Month, expected 1-12 but not validated.
    pub month: Option<i32>,
    /// Time axis granularity. Always present.
    pub time_resolution: TimeResolution,
    /// Opaque region identifier.
    pub region_code: Option<String>,
    /// Region level.
    pub region_level: Option<RegionLevel>,
    /// Opaque industry identifier.
    pub industry_code: Option<String>,
    /// Industry level.
    pub industry_level: Option<IndustryLevel>,
    /// Primary dataset selection.
    pub dataset_id: Option<String>,
    /// Datasets under comparison, in insertion order, without duplicates.
    pub dataset_ids: Vec<String>,
    /// Value label selection.
    pub value_label: Option<String>,
}

/// A subset of [`FilterState`] fields to merge over a state.
///
/// Nullable fields are double options: the outer `None` leaves the field alone,
/// `Some(None)` clears it and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialFilterState {
    /// Exact year.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub year: Option<Option<i32>>,
    /// Year range lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub year_from: Option<Option<i32>>,
    /// Year range upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub year_to: Option<Option<i32>>,
    /// Quarter.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub quarter: Option<Option<i32>>,
    /// Month.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub month: Option<Option<i32>>,
    /// Time axis granularity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_resolution: Option<TimeResolution>,
    /// Region identifier.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub region_code: Option<Option<String>>,
    /// Region level.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub region_level: Option<Option<RegionLevel>>,
    /// Industry identifier.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub industry_code: Option<Option<String>>,
    /// Industry level.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub industry_level: Option<Option<IndustryLevel>>,
    /// Primary dataset.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub dataset_id: Option<Option<String>>,
    /// Datasets under comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_ids: Option<Vec<String>>,
    /// Value label.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub value_label: Option<Option<String>>,
}

impl FilterState {
    /// Creates the canonical default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with every field present in `partial` written over.
    #[must_use]
    pub fn merged(&self, partial: &PartialFilterState) -> Self {
        fn pick<T: Clone>(current: &T, over: Option<&T>) -> T {
            over.cloned().unwrap_or_else(|| current.clone())
        }

        Self {
            year: pick(&self.year, partial.year.as_ref()),
            year_from: pick(&self.year_from, partial.year_from.as_ref()),
            year_to: pick(&self.year_to, partial.year_to.as_ref()),
            quarter: pick(&self.quarter, partial.quarter.as_ref()),
            month: pick(&self.month, partial.month.as_ref()),
            time_resolution: partial.time_resolution.unwrap_or(self.time_resolution),
            region_code: pick(&self.region_code, partial.region_code.as_ref()),
            region_level: pick(&self.region_level, partial.region_level.as_ref()),
            industry_code: pick(&self.industry_code, partial.industry_code.as_ref()),
            industry_level: pick(&self.industry_level, partial.industry_level.as_ref()),
            dataset_id: pick(&self.dataset_id, partial.dataset_id.as_ref()),
            dataset_ids: pick(&self.dataset_ids, partial.dataset_ids.as_ref()),
            value_label: pick(&self.value_label, partial.value_label.as_ref()),
        }
    }
}

impl PartialFilterState {
    /// Returns true if no field would be written by a merge.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
