//! Owner of the current filter state for one session.

use std::sync::Arc;

use super::action::FilterAction;
use super::query::{ApiQueryParams, has_active_filters, to_query_params};
use super::reducer::apply;
use super::state::FilterState;
use super::url_sync::QueryParams;

/// Holds the current state and applies dispatched actions in order.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    current: Arc<FilterState>,
}

impl FilterStore {
    /// Starts from the default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the state encoded in the URL.
    #[must_use]
    pub fn from_url(params: &QueryParams) -> Self {
        Self {
            current: Arc::new(FilterState::from_url(params)),
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &Arc<FilterState> {
        &self.current
    }

    /// Applies an action. Returns true if the state was replaced.
    pub fn dispatch(&mut self, action: &FilterAction) -> bool {
        let next = apply(&self.current, action);
        let changed = !Arc::ptr_eq(&next, &self.current);
        if changed {
            tracing::trace!(action = action.kind(), "filter state replaced");
            self.current = next;
        }
        changed
    }

    /// Applies several actions in order. Returns true if any replaced the state.
    pub fn dispatch_all<'a>(&mut self, actions: impl IntoIterator<Item = &'a FilterAction>) -> bool {
        actions
            .into_iter()
            .fold(false, |changed, action| self.dispatch(action) || changed)
    }

    /// The query string the page URL should carry.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.current.to_query_string()
    }

    /// The parameters for the statistics query API.
    #[must_use]
    pub fn api_params(&self) -> ApiQueryParams {
        to_query_params(&self.current)
    }

    /// Returns true if any selection narrows the data.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        has_active_filters(&self.current)
    }
}
