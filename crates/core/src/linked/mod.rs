//! Multi-dataset linkage on the shared dimension key.
//!
//! Rows from different datasets that share year, quarter, month, region and
//! industry are combined into one [`LinkedDataPoint`] with a value per dataset.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Statistic;


/// The dimension key rows are linked on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkKey {
    /// Year.
    pub year: i32,
    /// Quarter.
    pub quarter: Option<i32>,
    /// Month.
    pub month: Option<i32>,
    /// Region code.
    pub region_code: Option<String>,
    /// Industry code.
    pub industry_code: Option<String>,
}

impl LinkKey {
    /// The key of a statistic row.
    #[must_use]
    pub fn of(stat: &Statistic) -> Self {
        Self {
            year: stat.year,
            quarter: stat.quarter,
            month: stat.month,
            region_code: stat.region_code.clone(),
            industry_code: stat.industry_code.clone(),
        }
    }

    /// Presentation order: newest first, missing sub-keys last, codes ascending.
    #[must_use]
    pub fn presentation_cmp(&self, other: &Self) -> Ordering {
        fn desc_missing_last(a: Option<i32>, b: Option<i32>) -> Ordering {
            (a.is_none(), Reverse(a)).cmp(&(b.is_none(), Reverse(b)))
        }
        fn asc_missing_last(a: Option<&String>, b: Option<&String>) -> Ordering {
            (a.is_none(), a).cmp(&(b.is_none(), b))
        }

        other
            .year
            .cmp(&self.year)
            .then_with(|| desc_missing_last(self.quarter, other.quarter))
            .then_with(|| desc_missing_last(self.month, other.month))
            .then_with(|| asc_missing_last(self.region_code.as_ref(), other.region_code.as_ref()))
            .then_with(|| asc_missing_last(self.industry_code.as_ref(), other.industry_code.as_ref()))
    }
}

/// Per-dataset descriptive fields of a linked value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    /// Unit of measurement.
    pub unit: Option<String>,
    /// Measure label.
    pub value_label: Option<String>,
    /// Quality flag.
    pub data_quality: Option<String>,
}

/// Values of several datasets at one dimension key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedDataPoint {
    /// Shared dimension key.
    #[serde(flatten)]
    pub key: LinkKey,
    /// Dataset id -> value.
    pub values: BTreeMap<String, Option<Decimal>>,
    /// Dataset id -> metadata.
    pub metadata: BTreeMap<String, LinkMetadata>,
}

/// Groups the rows of the requested datasets by dimension key.
///
/// Rows of other datasets are ignored. When one dataset has several rows at the
/// same key the later row wins. The result is in presentation order.
#[must_use]
pub fn link_statistics(stats: &[Statistic], dataset_ids: &[String]) -> Vec<LinkedDataPoint> {
    let mut groups: HashMap<LinkKey, LinkedDataPoint> = HashMap::new();

    for stat in stats.iter().filter(|s| dataset_ids.contains(&s.dataset_id)) {
        let key = LinkKey::of(stat);
        let point = groups.entry(key.clone()).or_insert_with(|| LinkedDataPoint {
            key,
            values: BTreeMap::new(),
            metadata: BTreeMap::new(),
        });
        point.values.insert(stat.dataset_id.clone(), stat.value);
        point.metadata.insert(
            stat.dataset_id.clone(),
            LinkMetadata {
                unit: stat.unit.clone(),
                value_label: stat.value_label.clone(),
                data_quality: stat.data_quality.clone(),
            },
        );
    }

    let mut points: Vec<LinkedDataPoint> = groups.into_values().collect();
    points.sort_by(|a, b| a.key.presentation_cmp(&b.key));
    points
}
