//! Region and industry dimension tables.

use tilasto_core::catalog::{Industry, Region};
use tilasto_core::dimension::{IndustryLevel, RegionLevel};

use crate::error::StoreError;
use crate::store::MemoryStore;

impl MemoryStore {
    /// Inserts or replaces regions by code. Returns how many were written.
    pub fn upsert_regions(&self, regions: impl IntoIterator<Item = Region>) -> usize {
        let mut count = 0;
        for region in regions {
            self.tables.regions.insert(region.code.clone(), region);
            count += 1;
        }
        tracing::debug!(count, "Upserted regions");
        count
    }

    /// Inserts or replaces industries by code. Returns how many were written.
    pub fn upsert_industries(&self, industries: impl IntoIterator<Item = Industry>) -> usize {
        let mut count = 0;
        for industry in industries {
            self.tables.industries.insert(industry.code.clone(), industry);
            count += 1;
        }
        tracing::debug!(count, "Upserted industries");
        count
    }

    /// Looks up a region.
    pub fn region(&self, code: &str) -> Result<Region, StoreError> {
        self.tables
            .regions
            .get(code)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::not_found("Region", code))
    }

    /// Looks up an industry.
    pub fn industry(&self, code: &str) -> Result<Industry, StoreError> {
        self.tables
            .industries
            .get(code)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::not_found("Industry", code))
    }

    /// Returns true when the region code is known.
    #[must_use]
    pub fn has_region(&self, code: &str) -> bool {
        self.tables.regions.contains_key(code)
    }

    /// Returns true when the industry code is known.
    #[must_use]
    pub fn has_industry(&self, code: &str) -> bool {
        self.tables.industries.contains_key(code)
    }

    /// Level of a known region.
    pub(crate) fn region_level_of(&self, code: &str) -> Option<RegionLevel> {
        self.tables.regions.get(code).map(|r| r.region_level)
    }

    /// Level of a known industry.
    pub(crate) fn industry_level_of(&self, code: &str) -> Option<IndustryLevel> {
        self.tables.industries.get(code).map(|r| r.level)
    }

    /// Regions ordered by code, optionally restricted to one level.
    #[must_use]
    pub fn list_regions(&self, level: Option<RegionLevel>) -> Vec<Region> {
        let mut regions: Vec<Region> = self
            .tables
            .regions
            .iter()
            .filter(|r| level.is_none_or(|l| r.region_level == l))
            .map(|r| r.value().clone())
            .collect();
        regions.sort_by(|a, b| a.code.cmp(&b.code));
        regions
    }

    /// Industries ordered by code, optionally restricted to one level.
    #[must_use]
    pub fn list_industries(&self, level: Option<IndustryLevel>) -> Vec<Industry> {
        let mut industries: Vec<Industry> = self
            .tables
            .industries
            .iter()
            .filter(|i| level.is_none_or(|l| i.level == l))
            .map(|i| i.value().clone())
            .collect();
        industries.sort_by(|a, b| a.code.cmp(&b.code));
        industries
    }

    /// Child regions of a parent code, ordered by code.
    #[must_use]
    pub fn child_regions(&self, parent_code: &str) -> Vec<Region> {
        let mut regions: Vec<Region> = self
            .tables
            .regions
            .iter()
            .filter(|r| r.parent_code.as_deref() == Some(parent_code))
            .map(|r| r.value().clone())
            .collect();
        regions.sort_by(|a, b| a.code.cmp(&b.code));
        regions
    }
}
