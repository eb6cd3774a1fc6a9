//! Filter state <-> URL query string.
//!
//! Keys are exact and case-sensitive (see [`keys`]). Parsing drops anything absent,
//! unparseable or outside a closed set; it never fills in defaults. Serializing emits
//! only present, non-default fields in a fixed key order.

use std::fmt;

use url::form_urlencoded;

use super::state::{FilterState, PartialFilterState};
use crate::dimension::{IndustryLevel, RegionLevel, TimeResolution};

/// URL query-string key names.
pub mod keys {
    /// Exact year.
    pub const YEAR: &str = "year";
    /// Year range lower bound.
    pub const YEAR_FROM: &str = "yearFrom";
    /// Year range upper bound.
    pub const YEAR_TO: &str = "yearTo";
    /// Quarter.
    pub const QUARTER: &str = "quarter";
    /// Month.
    pub const MONTH: &str = "month";
    /// Time resolution, omitted when it is the default.
    pub const RESOLUTION: &str = "resolution";
    /// Region code.
    pub const REGION: &str = "region";
    /// Region level.
    pub const REGION_LEVEL: &str = "regionLevel";
    /// Industry code.
    pub const INDUSTRY: &str = "industry";
    /// Industry level.
    pub const INDUSTRY_LEVEL: &str = "industryLevel";
    /// Primary dataset.
    pub const DATASET: &str = "dataset";
    /// Comma-joined comparison datasets.
    pub const DATASETS: &str = "datasets";
    /// Value label.
    pub const VALUE_LABEL: &str = "valueLabel";
}

/// Ordered string multi-map backing a URL query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a query string. A leading `?` is ignored.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }

    /// Returns the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `key` appears at least once.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Appends a pair, keeping existing values for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Replaces every value for `key` with a single one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.pairs.retain(|(k, _)| *k != key);
        self.pairs.push((key, value.into()));
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encodes as `application/x-www-form-urlencoded`, without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Reads filter fields from URL parameters.
///
/// Only `Some(Some(_))` values are ever produced; absent, empty or invalid keys stay
/// `None`. `datasets=` yields an empty list rather than an absent field.
#[must_use]
pub fn parse_url_params(params: &QueryParams) -> PartialFilterState {
    let int = |key: &str| params.get(key).and_then(parse_int).map(Some);
    let text = |key: &str| {
        params
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| Some(v.to_string()))
    };

    PartialFilterState {
        year: int(keys::YEAR),
        year_from: int(keys::YEAR_FROM),
        year_to: int(keys::YEAR_TO),
        quarter: int(keys::QUARTER),
        month: int(keys::MONTH),
        time_resolution: params.get(keys::RESOLUTION).and_then(TimeResolution::parse),
        region_code: text(keys::REGION),
        region_level: params
            .get(keys::REGION_LEVEL)
            .and_then(RegionLevel::parse)
            .map(Some),
        industry_code: text(keys::INDUSTRY),
        industry_level: params
            .get(keys::INDUSTRY_LEVEL)
            .and_then(IndustryLevel::parse)
            .map(Some),
        dataset_id: text(keys::DATASET),
        dataset_ids: params.get(keys::DATASETS).map(split_dataset_ids),
        value_label: text(keys::VALUE_LABEL),
    }
}

/// Writes the active filter fields as URL parameters.
///
/// Integers are emitted whenever present, zero included. Strings are emitted only
/// when present and non-empty. The resolution is emitted only when it differs from
/// the default and the dataset list only when non-empty.
#[must_use]
pub fn serialize_url_params(state: &FilterState) -> QueryParams {
    let mut params = QueryParams::new();

    let ints = [
        (keys::YEAR, state.year),
        (keys::YEAR_FROM, state.year_from),
        (keys::YEAR_TO, state.year_to),
        (keys::QUARTER, state.quarter),
        (keys::MONTH, state.month),
    ];
    for (key, value) in ints {
        if let Some(v) = value {
            params.append(key, v.to_string());
        }
    }

    if state.time_resolution != TimeResolution::default() {
        params.append(keys::RESOLUTION, state.time_resolution.as_str());
    }

    append_text(&mut params, keys::REGION, state.region_code.as_deref());
    if let Some(level) = state.region_level {
        params.append(keys::REGION_LEVEL, level.as_str());
    }
    append_text(&mut params, keys::INDUSTRY, state.industry_code.as_deref());
    if let Some(level) = state.industry_level {
        params.append(keys::INDUSTRY_LEVEL, level.as_str());
    }
    append_text(&mut params, keys::DATASET, state.dataset_id.as_deref());
    if !state.dataset_ids.is_empty() {
        params.append(keys::DATASETS, state.dataset_ids.join(","));
    }
    append_text(&mut params, keys::VALUE_LABEL, state.value_label.as_deref());

    params
}

impl FilterState {
    /// Builds the session's initial state: defaults overlaid with the URL parameters.
    #[must_use]
    pub fn from_url(params: &QueryParams) -> Self {
        Self::default().merged(&parse_url_params(params))
    }

    /// Renders the state as a query string, empty for the default state.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        serialize_url_params(self).to_query_string()
    }
}

fn parse_int(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn split_dataset_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').filter(|s| !s.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn append_text(params: &mut QueryParams, key: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        params.append(key, v);
    }
}
