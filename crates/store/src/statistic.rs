//! Statistics rows: bulk upsert and filtered queries.

use std::cmp::Reverse;

use tilasto_core::catalog::{NewStatistic, Statistic};
use tilasto_core::filter::ApiQueryParams;
use tilasto_core::linked::{LinkedDataPoint, link_statistics};
use tilasto_shared::types::{PageRequest, PageResponse};

use crate::error::StoreError;
use crate::store::{MemoryStore, StatisticKey};

/// Counts from a bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Rows that did not exist before.
    pub inserted: usize,
    /// Existing rows whose value was replaced.
    pub updated: usize,
}

impl MemoryStore {
    /// Inserts rows, replacing any row with the same dataset, period, dimensions and label.
    ///
    /// Every row must reference an existing dataset; nothing is written otherwise.
    pub async fn upsert_statistics(
        &self,
        rows: Vec<NewStatistic>,
    ) -> Result<UpsertOutcome, StoreError> {
        if let Some(unknown) = rows
            .iter()
            .find(|r| !self.tables.datasets.contains_key(&r.dataset_id))
        {
            return Err(StoreError::not_found("Dataset", &unknown.dataset_id));
        }

        let mut outcome = UpsertOutcome::default();
        let mut table = self.tables.statistics.write().await;
        for row in rows {
            let key = StatisticKey::of(&row);
            if let Some(&pos) = table.index.get(&key) {
                let id = table.rows[pos].id;
                table.rows[pos] = row.with_id(id);
                outcome.updated += 1;
            } else {
                let id = table.next_id;
                table.next_id += 1;
                let pos = table.rows.len();
                table.rows.push(row.with_id(id));
                table.index.insert(key, pos);
                outcome.inserted += 1;
            }
        }
        drop(table);

        tracing::debug!(
            inserted = outcome.inserted,
            updated = outcome.updated,
            "Upserted statistics"
        );
        Ok(outcome)
    }

    /// Removes every row of a dataset. Returns how many were removed.
    pub async fn delete_statistics(&self, dataset_id: &str) -> usize {
        let mut table = self.tables.statistics.write().await;
        let before = table.rows.len();
        table.rows.retain(|s| s.dataset_id != dataset_id);
        let removed = before - table.rows.len();
        if removed > 0 {
            table.reindex();
        }
        removed
    }

    /// Number of rows, optionally for one dataset.
    pub async fn statistic_count(&self, dataset_id: Option<&str>) -> usize {
        let table = self.tables.statistics.read().await;
        match dataset_id {
            Some(id) => table.rows.iter().filter(|s| s.dataset_id == id).count(),
            None => table.rows.len(),
        }
    }

    /// One page of rows matching every present filter, newest year first.
    ///
    /// `region_level` and `industry_level` match rows whose code resolves to a
    /// region or industry of that level.
    pub async fn query_statistics(
        &self,
        params: &ApiQueryParams,
        page: PageRequest,
    ) -> PageResponse<Statistic> {
        let table = self.tables.statistics.read().await;
        let mut matching: Vec<Statistic> = table
            .rows
            .iter()
            .filter(|s| {
                params
                    .dataset_id
                    .as_ref()
                    .is_none_or(|id| &s.dataset_id == id)
            })
            .filter(|s| self.matches_dimensions(s, params))
            .cloned()
            .collect();
        drop(table);

        matching.sort_by_key(|s| (Reverse(s.year), Reverse(s.id)));
        PageResponse::from_all(matching, page)
    }

    /// Rows of the given datasets matching the non-dataset filters of `params`.
    pub async fn statistics_for(
        &self,
        dataset_ids: &[String],
        params: &ApiQueryParams,
    ) -> Vec<Statistic> {
        let table = self.tables.statistics.read().await;
        let mut matching: Vec<Statistic> = table
            .rows
            .iter()
            .filter(|s| dataset_ids.contains(&s.dataset_id))
            .filter(|s| self.matches_dimensions(s, params))
            .cloned()
            .collect();
        drop(table);

        matching.sort_by_key(|s| (Reverse(s.year), Reverse(s.id)));
        matching
    }

    /// Rows of several datasets joined on their shared dimension key.
    pub async fn linked_data(
        &self,
        dataset_ids: &[String],
        params: &ApiQueryParams,
    ) -> Vec<LinkedDataPoint> {
        let rows = self.statistics_for(dataset_ids, params).await;
        link_statistics(&rows, dataset_ids)
    }

    fn matches_dimensions(&self, stat: &Statistic, params: &ApiQueryParams) -> bool {
        if params.year.is_some_and(|y| stat.year != y)
            || params.year_from.is_some_and(|y| stat.year < y)
            || params.year_to.is_some_and(|y| stat.year > y)
        {
            return false;
        }
        if params.quarter.is_some_and(|q| stat.quarter != Some(q))
            || params.month.is_some_and(|m| stat.month != Some(m))
        {
            return false;
        }
        if !eq_opt(params.region_code.as_deref(), stat.region_code.as_deref())
            || !eq_opt(params.industry_code.as_deref(), stat.industry_code.as_deref())
            || !eq_opt(params.value_label.as_deref(), stat.value_label.as_deref())
        {
            return false;
        }
        if let Some(level) = params.region_level {
            let resolved = stat
                .region_code
                .as_deref()
                .and_then(|code| self.region_level_of(code));
            if resolved != Some(level) {
                return false;
            }
        }
        if let Some(level) = params.industry_level {
            let resolved = stat
                .industry_code
                .as_deref()
                .and_then(|code| self.industry_level_of(code));
            if resolved != Some(level) {
                return false;
            }
        }
        true
    }
}

/// An absent filter matches everything; a present one requires equality.
fn eq_opt(filter: Option<&str>, value: Option<&str>) -> bool {
    filter.is_none_or(|f| value == Some(f))
}
