//! Filter state engine.
//!
//! A flat filter record over the time, geography, industry and dataset axes,
//! driven by a pure transition function and kept in sync with the page URL.
//!
//! - [`FilterState`] - the record itself, replaced (never mutated) on change
//! - [`FilterAction`] / [`apply`] - discrete user actions and the transition function
//! - [`parse_url_params`] / [`serialize_url_params`] - URL query-string sync
//! - [`to_query_params`] / [`has_active_filters`] - projection for the statistics query API
//!
//! Every function here is total: malformed input is dropped, never reported.

mod action;
mod query;
mod reducer;
mod state;
mod store;
mod url_sync;

pub use action::FilterAction;
pub use query::{ApiQueryParams, has_active_filters, to_query_params};
pub use reducer::apply;
pub use state::{FilterState, PartialFilterState};
pub use store::FilterStore;
pub use url_sync::{QueryParams, keys, parse_url_params, serialize_url_params};

#[cfg(test)]
mod tests;

#[cfg(test)]
mod props;
