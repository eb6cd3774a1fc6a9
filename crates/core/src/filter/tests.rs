use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::dimension::{IndustryLevel, RegionLevel, TimeResolution};

fn sample_state() -> FilterState {
    FilterState {
        year: Some(2023),
        quarter: Some(2),
        time_resolution: TimeResolution::Quarter,
        region_code: Some("091".into()),
        region_level: Some(RegionLevel::Kunta),
        industry_code: Some("C".into()),
        industry_level: Some(IndustryLevel::Section),
        dataset_id: Some("tyonv_001".into()),
        dataset_ids: vec!["ds1".into(), "ds2".into()],
        value_label: Some("employment".into()),
        ..FilterState::default()
    }
}

fn run(actions: &[FilterAction]) -> Arc<FilterState> {
    actions
        .iter()
        .fold(Arc::new(FilterState::default()), |state, action| apply(&state, action))
}

// ============================================================================
// Transition function
// ============================================================================

#[test]
fn test_year_then_range_clears_exact_year() {
    let state = run(&[
        FilterAction::SetYear(Some(2023)),
        FilterAction::SetYearRange {
            from: Some(2020),
            to: Some(2025),
        },
    ]);

    assert_eq!(state.year, None);
    assert_eq!(state.year_from, Some(2020));
    assert_eq!(state.year_to, Some(2025));
}

#[test]
fn test_set_year_zero_is_distinct_from_absent() {
    let state = run(&[FilterAction::SetYear(Some(0)), FilterAction::SetQuarter(Some(0))]);
    assert_eq!(state.year, Some(0));
    assert_eq!(state.quarter, Some(0));
}

#[rstest]
#[case(TimeResolution::Year, None, None)]
#[case(TimeResolution::Quarter, Some(3), None)]
#[case(TimeResolution::Month, Some(3), Some(8))]
fn test_resolution_clears_finer_selections(
    #[case] resolution: TimeResolution,
    #[case] quarter: Option<i32>,
    #[case] month: Option<i32>,
) {
    let state = run(&[
        FilterAction::SetTimeResolution(TimeResolution::Month),
        FilterAction::SetQuarter(Some(3)),
        FilterAction::SetMonth(Some(8)),
        FilterAction::SetTimeResolution(resolution),
    ]);

    assert_eq!(state.time_resolution, resolution);
    assert_eq!(state.quarter, quarter);
    assert_eq!(state.month, month);
}

#[rstest]
#[case(
    FilterAction::SetDatasetId(Some("tyonv_001".into())),
    FilterState { dataset_id: Some("tyonv_001".into()), ..FilterState::default() }
)]
#[case(
    FilterAction::SetValueLabel(Some("employment".into())),
    FilterState { value_label: Some("employment".into()), ..FilterState::default() }
)]
#[case(
    FilterAction::SetRegionLevel(Some(RegionLevel::Seutukunta)),
    FilterState { region_level: Some(RegionLevel::Seutukunta), ..FilterState::default() }
)]
#[case(
    FilterAction::SetIndustryLevel(Some(IndustryLevel::Division)),
    FilterState { industry_level: Some(IndustryLevel::Division), ..FilterState::default() }
)]
fn test_single_field_setter(#[case] action: FilterAction, #[case] expected: FilterState) {
    assert_eq!(*run(&[action]), expected);
}

#[rstest]
#[case(FilterAction::SetDatasetId(None), FilterState { dataset_id: None, ..sample_state() })]
#[case(FilterAction::SetValueLabel(None), FilterState { value_label: None, ..sample_state() })]
#[case(FilterAction::SetRegionLevel(None), FilterState { region_level: None, ..sample_state() })]
#[case(FilterAction::SetIndustryLevel(None), FilterState { industry_level: None, ..sample_state() })]
fn test_single_field_setter_clears(#[case] action: FilterAction, #[case] expected: FilterState) {
    assert_eq!(*apply(&Arc::new(sample_state()), &action), expected);
}

#[test]
fn test_set_region_updates_both_fields() {
    let state = run(&[
        FilterAction::SetRegion {
            code: Some("091".into()),
            level: Some(RegionLevel::Kunta),
        },
        FilterAction::SetRegion {
            code: None,
            level: Some(RegionLevel::Maakunta),
        },
    ]);

    assert_eq!(state.region_code, None);
    assert_eq!(state.region_level, Some(RegionLevel::Maakunta));
}

#[test]
fn test_set_industry_updates_both_fields() {
    let state = run(&[
        FilterAction::SetIndustryCode(Some("62".into())),
        FilterAction::SetIndustry {
            code: Some("C".into()),
            level: Some(IndustryLevel::Section),
        },
    ]);

    assert_eq!(state.industry_code.as_deref(), Some("C"));
    assert_eq!(state.industry_level, Some(IndustryLevel::Section));
}

#[test]
fn test_add_present_dataset_returns_same_arc() {
    let state = run(&[FilterAction::AddDatasetId("ds1".into())]);
    let next = apply(&state, &FilterAction::AddDatasetId("ds1".into()));
    assert!(Arc::ptr_eq(&state, &next));
}

#[test]
fn test_remove_dataset_removes_only_that_id() {
    let state = run(&[
        FilterAction::SetDatasetIds(vec!["a".into(), "b".into(), "c".into()]),
        FilterAction::RemoveDatasetId("b".into()),
    ]);
    assert_eq!(state.dataset_ids, vec!["a".to_string(), "c".to_string()]);
}

#[test]
fn test_set_dataset_ids_keeps_caller_order() {
    let state = run(&[FilterAction::SetDatasetIds(vec!["z".into(), "a".into()])]);
    assert_eq!(state.dataset_ids, vec!["z".to_string(), "a".to_string()]);
}

#[test]
fn test_set_filters_merges_shallowly() {
    let base = Arc::new(sample_state());
    let partial = PartialFilterState {
        year: Some(None),
        month: Some(Some(4)),
        region_code: Some(Some("020".into())),
        ..PartialFilterState::default()
    };

    let next = apply(&base, &FilterAction::SetFilters(partial));

    assert_eq!(next.year, None);
    assert_eq!(next.month, Some(4));
    assert_eq!(next.region_code.as_deref(), Some("020"));
    assert_eq!(next.region_level, Some(RegionLevel::Kunta));
    assert_eq!(next.dataset_ids, base.dataset_ids);
}

#[test]
fn test_set_filters_with_only_resolution() {
    let base = Arc::new(sample_state());
    let partial = PartialFilterState {
        time_resolution: Some(TimeResolution::Month),
        ..PartialFilterState::default()
    };

    let next = apply(&base, &FilterAction::SetFilters(partial));

    assert_eq!(
        *next,
        FilterState {
            time_resolution: TimeResolution::Month,
            ..sample_state()
        }
    );
}

#[test]
fn test_reset_time_filters_leaves_other_axes() {
    let next = apply(&Arc::new(sample_state()), &FilterAction::ResetTimeFilters);

    assert_eq!(next.year, None);
    assert_eq!(next.quarter, None);
    assert_eq!(next.time_resolution, TimeResolution::Year);
    assert_eq!(next.region_code.as_deref(), Some("091"));
    assert_eq!(next.industry_code.as_deref(), Some("C"));
    assert_eq!(next.dataset_id.as_deref(), Some("tyonv_001"));
}

#[test]
fn test_reset_industry_filters_is_scoped() {
    let next = apply(&Arc::new(sample_state()), &FilterAction::ResetIndustryFilters);

    assert_eq!(next.industry_code, None);
    assert_eq!(next.industry_level, None);
    assert_eq!(next.region_level, Some(RegionLevel::Kunta));
    assert_eq!(next.year, Some(2023));
}

// ============================================================================
// Action events
// ============================================================================

#[test]
fn test_action_deserializes_from_tagged_event() {
    let action: FilterAction =
        serde_json::from_value(json!({"type": "SET_YEAR_RANGE", "payload": {"from": 2020, "to": 2025}}))
            .unwrap();
    assert_eq!(
        action,
        FilterAction::SetYearRange {
            from: Some(2020),
            to: Some(2025)
        }
    );

    let action: FilterAction =
        serde_json::from_value(json!({"type": "SET_REGION_LEVEL", "payload": "maakunta"})).unwrap();
    assert_eq!(action, FilterAction::SetRegionLevel(Some(RegionLevel::Maakunta)));

    let action: FilterAction = serde_json::from_value(json!({"type": "RESET_FILTERS"})).unwrap();
    assert_eq!(action, FilterAction::ResetFilters);
}

#[test]
fn test_unknown_event_type_is_noop() {
    let action: FilterAction = serde_json::from_value(json!({"type": "TOGGLE_DARK_MODE"})).unwrap();
    assert_eq!(action, FilterAction::Unknown);

    let state = Arc::new(sample_state());
    assert!(Arc::ptr_eq(&state, &apply(&state, &action)));
}

#[rstest]
#[case(json!({"type": "SET_THEME", "payload": {"dark": true}}))]
#[case(json!({"type": "SET_LOCALE", "payload": "sv"}))]
#[case(json!({"type": "PING", "payload": null}))]
#[case(json!({"type": "UNKNOWN", "payload": [1, 2]}))]
fn test_unknown_event_with_payload_is_noop(#[case] event: serde_json::Value) {
    let action: FilterAction = serde_json::from_value(event).unwrap();
    assert_eq!(action, FilterAction::Unknown);
}

#[test]
fn test_known_event_with_bad_payload_is_rejected() {
    let bad_payload = serde_json::from_value::<FilterAction>(json!({"type": "SET_YEAR", "payload": "soon"}));
    assert!(bad_payload.is_err());

    let untagged = serde_json::from_value::<FilterAction>(json!({"payload": 2024}));
    assert!(untagged.is_err());
}

#[test]
fn test_action_serializes_as_tagged_event() {
    let value = serde_json::to_value(FilterAction::SetYear(Some(2024))).unwrap();
    assert_eq!(value, json!({"type": "SET_YEAR", "payload": 2024}));

    let back: FilterAction = serde_json::from_value(value).unwrap();
    assert_eq!(back, FilterAction::SetYear(Some(2024)));
}

#[test]
fn test_set_filters_event_distinguishes_null_from_missing() {
    let action: FilterAction = serde_json::from_value(json!({
        "type": "SET_FILTERS",
        "payload": {"year": null, "regionCode": "091"}
    }))
    .unwrap();

    let FilterAction::SetFilters(partial) = action else {
        panic!("expected SetFilters");
    };
    assert_eq!(partial.year, Some(None));
    assert_eq!(partial.region_code, Some(Some("091".into())));
    assert_eq!(partial.month, None);
}

// ============================================================================
// URL sync
// ============================================================================

#[test]
fn test_sample_state_round_trips() {
    let original = sample_state();
    let parsed = parse_url_params(&serialize_url_params(&original));

    assert_eq!(parsed.year, Some(Some(2023)));
    assert_eq!(parsed.quarter, Some(Some(2)));
    assert_eq!(parsed.time_resolution, Some(TimeResolution::Quarter));
    assert_eq!(parsed.region_code, Some(Some("091".into())));
    assert_eq!(parsed.region_level, Some(Some(RegionLevel::Kunta)));
    assert_eq!(parsed.industry_code, Some(Some("C".into())));
    assert_eq!(parsed.industry_level, Some(Some(IndustryLevel::Section)));
    assert_eq!(parsed.dataset_id, Some(Some("tyonv_001".into())));
    assert_eq!(parsed.dataset_ids, Some(vec!["ds1".into(), "ds2".into()]));
    assert_eq!(parsed.value_label, Some(Some("employment".into())));
    assert_eq!(FilterState::default().merged(&parsed), original);
}

#[test]
fn test_default_state_serializes_empty() {
    let params = serialize_url_params(&FilterState::default());
    assert!(params.is_empty());
    assert_eq!(FilterState::default().to_query_string(), "");
}

#[test]
fn test_serialize_key_order_and_encoding() {
    let state = FilterState {
        year_from: Some(2020),
        year_to: Some(2025),
        time_resolution: TimeResolution::Month,
        value_label: Some("Työlliset & työttömät".into()),
        dataset_ids: vec!["a".into(), "b".into()],
        ..FilterState::default()
    };

    assert_eq!(
        state.to_query_string(),
        "yearFrom=2020&yearTo=2025&resolution=month&datasets=a%2Cb&valueLabel=Ty%C3%B6lliset+%26+ty%C3%B6tt%C3%B6m%C3%A4t"
    );
}

#[test]
fn test_serialize_skips_empty_region_code() {
    let state = FilterState {
        region_code: Some(String::new()),
        year: Some(0),
        ..FilterState::default()
    };
    let params = serialize_url_params(&state);

    assert!(!params.contains_key(keys::REGION));
    assert_eq!(params.get(keys::YEAR), Some("0"));
}

#[rstest]
#[case("resolution=bogus")]
#[case("resolution=Year")]
#[case("regionLevel=county")]
#[case("industryLevel=SECTION")]
#[case("year=twenty")]
#[case("quarter=2.5")]
#[case("region=")]
#[case("")]
fn test_parse_drops_invalid_values(#[case] query: &str) {
    let parsed = parse_url_params(&QueryParams::parse(query));
    assert!(parsed.is_empty(), "{query} produced {parsed:?}");
}

#[rstest]
#[case("year=2023", Some(2023))]
#[case("year=0", Some(0))]
#[case("year=-5", Some(-5))]
#[case("year=%202024%20", Some(2024))]
#[case("year=2023&year=1999", Some(2023))]
fn test_parse_year(#[case] query: &str, #[case] expected: Option<i32>) {
    let parsed = parse_url_params(&QueryParams::parse(query));
    assert_eq!(parsed.year, expected.map(Some));
}

#[rstest]
#[case("datasets=", Some(vec![]))]
#[case("datasets=a", Some(vec!["a"]))]
#[case("datasets=a,b,a", Some(vec!["a", "b"]))]
#[case("datasets=a,,b,", Some(vec!["a", "b"]))]
#[case("dataset=a", None)]
fn test_parse_datasets(#[case] query: &str, #[case] expected: Option<Vec<&str>>) {
    let parsed = parse_url_params(&QueryParams::parse(query));
    let expected = expected.map(|ids| ids.into_iter().map(String::from).collect::<Vec<_>>());
    assert_eq!(parsed.dataset_ids, expected);
}

#[test]
fn test_from_url_overlays_defaults() {
    let state = FilterState::from_url(&QueryParams::parse("?year=2021&resolution=bogus&region=SSS"));

    assert_eq!(state.year, Some(2021));
    assert_eq!(state.time_resolution, TimeResolution::Year);
    assert_eq!(state.region_code.as_deref(), Some("SSS"));
    assert!(state.dataset_ids.is_empty());
}

#[test]
fn test_query_params_set_replaces_all_values() {
    let mut params = QueryParams::parse("a=1&b=2&a=3");
    assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);

    params.set("a", "9");

    assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["9"]);
    assert_eq!(params.len(), 2);
    assert_eq!(params.to_string(), "b=2&a=9");
}

// ============================================================================
// API projection and active-filter predicate
// ============================================================================

#[test]
fn test_projection_omits_absent_fields() {
    let state = FilterState {
        year: Some(2023),
        ..FilterState::default()
    };

    let value = serde_json::to_value(to_query_params(&state)).unwrap();

    assert_eq!(value, json!({"year": 2023}));
}

#[test]
fn test_projection_uses_snake_case_names() {
    let params = to_query_params(&sample_state());
    let value = serde_json::to_value(&params).unwrap();

    assert_eq!(
        value,
        json!({
            "year": 2023,
            "quarter": 2,
            "region_code": "091",
            "region_level": "kunta",
            "industry_code": "C",
            "industry_level": "section",
            "dataset_id": "tyonv_001",
            "value_label": "employment"
        })
    );
    assert_eq!(params.to_pairs().first(), Some(&("year", "2023".to_string())));
}

#[test]
fn test_projection_of_default_is_empty() {
    let params = to_query_params(&FilterState::default());
    assert!(params.is_empty());
    assert!(params.to_pairs().is_empty());
}

#[rstest]
#[case(FilterState::default(), false)]
#[case(FilterState { time_resolution: TimeResolution::Month, ..FilterState::default() }, false)]
#[case(FilterState { dataset_ids: vec!["x".into()], ..FilterState::default() }, true)]
#[case(FilterState { month: Some(0), ..FilterState::default() }, true)]
#[case(FilterState { industry_level: Some(IndustryLevel::Class), ..FilterState::default() }, true)]
fn test_has_active_filters(#[case] state: FilterState, #[case] expected: bool) {
    assert_eq!(has_active_filters(&state), expected);
}

// ============================================================================
// Store
// ============================================================================

#[test]
fn test_store_reports_identity_changes() {
    let mut store = FilterStore::from_url(&QueryParams::parse("datasets=ds1"));

    assert!(!store.dispatch(&FilterAction::AddDatasetId("ds1".into())));
    assert!(store.dispatch(&FilterAction::AddDatasetId("ds2".into())));
    assert!(!store.dispatch(&FilterAction::Unknown));
    assert_eq!(store.query_string(), "datasets=ds1%2Cds2");
}

#[test]
fn test_store_dispatch_all_in_order() {
    let mut store = FilterStore::new();
    let changed = store.dispatch_all(&[
        FilterAction::SetYear(Some(2023)),
        FilterAction::SetRegionCode(Some("091".into())),
        FilterAction::ResetGeographicFilters,
    ]);

    assert!(changed);
    assert!(store.has_active_filters());
    assert_eq!(
        store.api_params(),
        ApiQueryParams {
            year: Some(2023),
            ..ApiQueryParams::default()
        }
    );
}
