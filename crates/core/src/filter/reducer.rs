//! The filter transition function.

use std::sync::Arc;

use super::action::FilterAction;
use super::state::FilterState;
use crate::dimension::TimeResolution;

/// Applies an action and returns the resulting state.
///
/// Total and side-effect free. Transitions that change nothing (adding a dataset
/// already in the list, removing one that is not, an unknown action) hand back the
/// same `Arc`, so callers can detect change with [`Arc::ptr_eq`].
#[must_use]
pub fn apply(state: &Arc<FilterState>, action: &FilterAction) -> Arc<FilterState> {
    match action {
        FilterAction::AddDatasetId(id) if state.dataset_ids.contains(id) => Arc::clone(state),
        FilterAction::RemoveDatasetId(id) if !state.dataset_ids.contains(id) => Arc::clone(state),
        FilterAction::Unknown => Arc::clone(state),
        FilterAction::ResetFilters => Arc::new(FilterState::default()),
        _ => Arc::new(transition(state, action)),
    }
}

fn transition(state: &FilterState, action: &FilterAction) -> FilterState {
    let mut next = state.clone();

    match action {
        FilterAction::SetYear(v) => next.year = *v,
        FilterAction::SetYearRange { from, to } => {
            next.year_from = *from;
            next.year_to = *to;
            next.year = None;
        }
        FilterAction::SetQuarter(v) => next.quarter = *v,
        FilterAction::SetMonth(v) => next.month = *v,
        FilterAction::SetTimeResolution(resolution) => {
            next.time_resolution = *resolution;
            match resolution {
                TimeResolution::Year => {
                    next.quarter = None;
                    next.month = None;
                }
                TimeResolution::Quarter => next.month = None,
                TimeResolution::Month => {}
            }
        }
        FilterAction::SetRegionCode(v) => next.region_code.clone_from(v),
        FilterAction::SetRegionLevel(v) => next.region_level = *v,
        FilterAction::SetRegion { code, level } => {
            next.region_code.clone_from(code);
            next.region_level = *level;
        }
        FilterAction::SetIndustryCode(v) => next.industry_code.clone_from(v),
        FilterAction::SetIndustryLevel(v) => next.industry_level = *v,
        FilterAction::SetIndustry { code, level } => {
            next.industry_code.clone_from(code);
            next.industry_level = *level;
        }
        FilterAction::SetDatasetId(v) => next.dataset_id.clone_from(v),
        FilterAction::SetDatasetIds(ids) => next.dataset_ids.clone_from(ids),
        FilterAction::AddDatasetId(id) => next.dataset_ids.push(id.clone()),
        FilterAction::RemoveDatasetId(id) => {
            if let Some(pos) = next.dataset_ids.iter().position(|d| d == id) {
                next.dataset_ids.remove(pos);
            }
        }
        FilterAction::SetValueLabel(v) => next.value_label.clone_from(v),
        FilterAction::SetFilters(partial) => next = state.merged(partial),
        FilterAction::ResetTimeFilters => {
            next.year = None;
            next.year_from = None;
            next.year_to = None;
            next.quarter = None;
            next.month = None;
            next.time_resolution = TimeResolution::Year;
        }
        FilterAction::ResetGeographicFilters => {
            next.region_code = None;
            next.region_level = None;
        }
        FilterAction::ResetIndustryFilters => {
            next.industry_code = None;
            next.industry_level = None;
        }
        FilterAction::ResetFilters => next = FilterState::default(),
        FilterAction::Unknown => {}
    }

    next
}
