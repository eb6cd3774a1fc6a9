//! The data source seam between the fetcher and StatFin.

use serde_json::Value;
use tilasto_core::jsonstat::{JsonStatDataset, PxQuery, parse_jsonstat};

use crate::error::StatFinError;

/// Anything that can answer a PxWeb table query with JSON-stat.
///
/// Implemented by [`crate::StatFinClient`]; tests substitute canned documents.
#[async_trait::async_trait]
pub trait StatFinSource: Send + Sync {
    /// Posts a query for a table and returns the raw JSON-stat document.
    async fn fetch_table(&self, table_path: &str, query: &PxQuery) -> Result<Value, StatFinError>;

    /// Fetches a table and decodes the JSON-stat document.
    async fn fetch_and_parse(
        &self,
        table_path: &str,
        query: &PxQuery,
    ) -> Result<JsonStatDataset, StatFinError> {
        let raw = self.fetch_table(table_path, query).await?;
        Ok(parse_jsonstat(&raw)?)
    }
}
