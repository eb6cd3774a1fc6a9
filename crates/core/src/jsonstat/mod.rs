//! JSON-stat 2.0 decoding and PxWeb request/response types.
//!
//! StatFin serves table data as JSON-stat: a flat value array in row-major order
//! (first dimension varies slowest) plus per-dimension category indexes. This module
//! turns that into addressable data points.

pub mod dataset;
pub mod error;
pub mod metadata;
pub mod query;


pub use dataset::{Category, DataPoint, JsonStatDataset, ParsedDimension, Record, parse_jsonstat};
pub use error::JsonStatError;
pub use metadata::{NodeKind, TableMetadata, TableNode, TableVariable, VariableValue};
pub use query::{PxQuery, PxQueryItem, PxResponseFormat, PxSelection, SelectionFilter};
