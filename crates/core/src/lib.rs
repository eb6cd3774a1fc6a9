//! Core logic for Tilasto.
//!
//! This crate contains pure logic with ZERO network or storage dependencies.
//! Filter state, catalog records, JSON-stat decoding and normalization all live here.
//!
//! # Modules
//!
//! - `filter` - Filter state engine with URL sync and API projection
//! - `dimension` - Time resolution, region level and industry level vocabularies
//! - `catalog` - Regions, industries, datasets, statistics and fetch configurations
//! - `jsonstat` - JSON-stat 2.0 decoding and PxWeb query bodies
//! - `normalize` - Mapping StatFin cells onto the common dimension key
//! - `schedule` - Fetch configuration scheduling and run outcomes
//! - `linked` - Multi-dataset linkage on shared dimensions

pub mod catalog;
pub mod dimension;
pub mod filter;
pub mod jsonstat;
pub mod linked;
pub mod normalize;
pub mod schedule;
