//! Property-based tests for the filter state engine.
//!
//! - Property 1: No-op transitions preserve identity
//! - Property 2: Reset and resolution transitions
//! - Property 3: URL round trip

use std::sync::Arc;

use proptest::prelude::*;

use super::*;
use crate::dimension::{IndustryLevel, RegionLevel, TimeResolution};

fn resolution() -> impl Strategy<Value = TimeResolution> {
    prop::sample::select(TimeResolution::ALL)
}

fn region_level() -> impl Strategy<Value = RegionLevel> {
    prop::sample::select(RegionLevel::ALL)
}

fn industry_level() -> impl Strategy<Value = IndustryLevel> {
    prop::sample::select(IndustryLevel::ALL)
}

/// Strategy for arbitrary states with non-empty codes and comma-free dataset ids.
fn filter_state() -> impl Strategy<Value = FilterState> {
    let time = (
        proptest::option::of(any::<i32>()),
        proptest::option::of(1900i32..2100),
        proptest::option::of(1900i32..2100),
        proptest::option::of(0i32..5),
        proptest::option::of(0i32..13),
        resolution(),
    );
    let dims = (
        proptest::option::of("[0-9]{3}|MK[0-9]{2}|SSS"),
        proptest::option::of(region_level()),
        proptest::option::of("[A-U]|[0-9]{2,5}"),
        proptest::option::of(industry_level()),
    );
    let data = (
        proptest::option::of("[a-z]{4,8}_[0-9]{3}"),
        prop::collection::btree_set("[a-z0-9_]{1,8}", 0..5),
        proptest::option::of("[a-zA-Z äö&]{1,20}"),
    );

    (time, dims, data).prop_map(
        |(
            (year, year_from, year_to, quarter, month, time_resolution),
            (region_code, region_level, industry_code, industry_level),
            (dataset_id, dataset_ids, value_label),
        )| FilterState {
            year,
            year_from,
            year_to,
            quarter,
            month,
            time_resolution,
            region_code,
            region_level,
            industry_code,
            industry_level,
            dataset_id,
            dataset_ids: dataset_ids.into_iter().collect(),
            value_label,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Property 1: No-op transitions preserve identity
    // =========================================================================

    /// Adding a dataset that is already selected hands back the same state.
    #[test]
    fn prop_add_present_dataset_is_identity(state in filter_state(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!state.dataset_ids.is_empty());
        let id = pick.get(&state.dataset_ids).clone();
        let state = Arc::new(state);

        let next = apply(&state, &FilterAction::AddDatasetId(id));

        prop_assert!(Arc::ptr_eq(&state, &next));
    }

    /// Unknown actions hand back the same state.
    #[test]
    fn prop_unknown_action_is_identity(state in filter_state()) {
        let state = Arc::new(state);
        let next = apply(&state, &FilterAction::Unknown);
        prop_assert!(Arc::ptr_eq(&state, &next));
    }

    /// Removing a dataset that is not selected hands back the same state.
    #[test]
    fn prop_remove_absent_dataset_is_identity(state in filter_state()) {
        let state = Arc::new(state);
        // Generated ids never contain '-'
        let next = apply(&state, &FilterAction::RemoveDatasetId("not-selected".into()));
        prop_assert!(Arc::ptr_eq(&state, &next));
    }

    // =========================================================================
    // Property 2: Reset and resolution transitions
    // =========================================================================

    /// Reset always yields the canonical default.
    #[test]
    fn prop_reset_yields_default(state in filter_state()) {
        let next = apply(&Arc::new(state), &FilterAction::ResetFilters);
        prop_assert_eq!(&*next, &FilterState::default());
    }

    /// Switching to annual resolution clears quarter and month.
    #[test]
    fn prop_year_resolution_clears_sub_annual(state in filter_state()) {
        let next = apply(&Arc::new(state), &FilterAction::SetTimeResolution(TimeResolution::Year));
        prop_assert_eq!(next.quarter, None);
        prop_assert_eq!(next.month, None);
        prop_assert_eq!(next.time_resolution, TimeResolution::Year);
    }

    /// Adding a new dataset grows the list by one and appends at the end.
    #[test]
    fn prop_add_new_dataset_appends(state in filter_state(), id in "[A-Z]{3}-[0-9]{2}") {
        let before = state.dataset_ids.len();
        let next = apply(&Arc::new(state), &FilterAction::AddDatasetId(id.clone()));

        prop_assert_eq!(next.dataset_ids.len(), before + 1);
        prop_assert_eq!(next.dataset_ids.last(), Some(&id));
    }

    /// Add then remove of a new dataset restores the original list.
    #[test]
    fn prop_add_then_remove_restores_list(state in filter_state(), id in "[A-Z]{3}-[0-9]{2}") {
        let original = state.dataset_ids.clone();
        let state = Arc::new(state);

        let added = apply(&state, &FilterAction::AddDatasetId(id.clone()));
        let removed = apply(&added, &FilterAction::RemoveDatasetId(id));

        prop_assert_eq!(&removed.dataset_ids, &original);
    }

    /// Geographic reset touches only region fields.
    #[test]
    fn prop_geographic_reset_is_scoped(state in filter_state()) {
        let next = apply(&Arc::new(state.clone()), &FilterAction::ResetGeographicFilters);

        prop_assert_eq!(&next.region_code, &None);
        prop_assert_eq!(next.region_level, None);
        prop_assert_eq!(next.year, state.year);
        prop_assert_eq!(&next.industry_code, &state.industry_code);
        prop_assert_eq!(&next.dataset_ids, &state.dataset_ids);
    }

    // =========================================================================
    // Property 3: URL round trip
    // =========================================================================

    /// Every emitted field survives serialize, render, decode and parse.
    #[test]
    fn prop_url_round_trip(state in filter_state()) {
        let rendered = serialize_url_params(&state).to_query_string();
        let restored = FilterState::from_url(&QueryParams::parse(&rendered));
        prop_assert_eq!(restored, state);
    }

    /// Serialized parameters never carry duplicate keys.
    #[test]
    fn prop_serialize_keys_unique(state in filter_state()) {
        let params = serialize_url_params(&state);
        let mut names: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), total);
    }

    /// Resolution alone never makes a default state active.
    #[test]
    fn prop_resolution_never_activates(resolution in resolution()) {
        let state = FilterState { time_resolution: resolution, ..FilterState::default() };
        prop_assert!(!has_active_filters(&state));
    }
}
