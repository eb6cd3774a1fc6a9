//! Normalization of StatFin data points into statistic rows.
//!
//! StatFin tables name their dimensions freely (`Vuosi`, `Kuukausi`, `Alue`,
//! `Toimiala 2008`...). The normalizer finds the time, region, industry and value
//! dimensions of a dataset and maps every cell onto the common dimension key.

pub mod codes;
pub mod error;
pub mod normalizer;


pub use codes::{TimePeriod, normalize_industry_code, normalize_region_code, parse_time_code};
pub use error::NormalizeError;
pub use normalizer::{DataNormalizer, DimensionRole, DimensionRoles, NormalizedRecord};
