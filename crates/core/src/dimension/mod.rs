//! Statistical dimension vocabularies.
//!
//! Closed sets of levels used by filters, catalog records and normalization:
//! time resolution, administrative region level and TOL 2008 industry level.

mod levels;

pub(crate) use levels::closed_set;
pub use levels::{IndustryLevel, RegionLevel, TimeResolution};
