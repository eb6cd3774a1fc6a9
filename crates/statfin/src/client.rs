//! HTTP client for the StatFin PxWeb API.
//!
//! Three endpoints are used:
//! - `GET {base}/{path}` on a folder lists its children
//! - `GET {base}/{table}` on a table returns its metadata
//! - `POST {base}/{table}` with a query returns the data as JSON-stat

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tilasto_core::jsonstat::{JsonStatDataset, PxQuery, TableMetadata, TableNode};
use tilasto_shared::config::StatFinConfig;
use url::Url;

use crate::cache::MetadataCache;
use crate::error::StatFinError;
use crate::retry::{AttemptFailure, RetryPolicy, StatusClass, parse_retry_after};
use crate::source::StatFinSource;

/// Longest response body excerpt kept in a client error.
const ERROR_BODY_LIMIT: usize = 200;

/// Async StatFin client with retry and a metadata cache.
#[derive(Clone)]
pub struct StatFinClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    cache: MetadataCache,
}

impl std::fmt::Debug for StatFinClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatFinClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl StatFinClient {
    /// Creates a client for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StatFinError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| StatFinError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("tilasto/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StatFinError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            retry: RetryPolicy::default(),
            cache: MetadataCache::new(),
        })
    }

    /// Creates a client from configuration.
    pub fn from_config(config: &StatFinConfig) -> Result<Self, StatFinError> {
        Ok(Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))?
            .with_retry_policy(RetryPolicy::from_config(config))
            .with_cache(MetadataCache::with_config(1_000, config.cache_ttl_secs)))
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the metadata cache.
    #[must_use]
    pub fn with_cache(mut self, cache: MetadataCache) -> Self {
        self.cache = cache;
        self
    }

    /// Base URL all paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The metadata cache.
    #[must_use]
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Resolves a table or folder path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, StatFinError> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(self.base_url.clone());
        }
        self.base_url
            .join(trimmed)
            .map_err(|e| StatFinError::InvalidUrl(format!("{trimmed}: {e}")))
    }

    /// Lists the folders and tables under `path` (empty for the root).
    pub async fn list_tables(&self, path: &str) -> Result<Vec<TableNode>, StatFinError> {
        let key = path.trim_matches('/');
        if let Some(cached) = self.cache.listing(key).await {
            tracing::debug!(path = key, "Table listing served from cache");
            return Ok(cached.as_ref().clone());
        }

        let url = self.endpoint(key)?;
        let response = self.execute(|| self.http.get(url.clone())).await?;
        let nodes: Vec<TableNode> = read_json(response).await?;
        let nodes: Vec<TableNode> = nodes.into_iter().map(|n| n.under(key)).collect();

        tracing::debug!(path = key, count = nodes.len(), "Fetched table listing");
        self.cache.insert_listing(key, Arc::new(nodes.clone())).await;
        Ok(nodes)
    }

    /// Fetches the variables of a table.
    pub async fn table_metadata(&self, table_path: &str) -> Result<TableMetadata, StatFinError> {
        let key = table_path.trim_matches('/');
        if let Some(cached) = self.cache.metadata(key).await {
            tracing::debug!(table = key, "Table metadata served from cache");
            return Ok(cached.as_ref().clone());
        }

        let url = self.endpoint(key)?;
        let response = self.execute(|| self.http.get(url.clone())).await?;
        let mut metadata: TableMetadata = read_json(response).await?;
        if metadata.table_id.is_empty() {
            metadata.table_id = key.to_string();
        }

        tracing::debug!(
            table = key,
            variables = metadata.variables.len(),
            "Fetched table metadata"
        );
        self.cache.insert_metadata(key, Arc::new(metadata.clone())).await;
        Ok(metadata)
    }

    /// Posts a query for a table and returns the raw JSON-stat document.
    pub async fn fetch_table(&self, table_path: &str, query: &PxQuery) -> Result<Value, StatFinError> {
        let url = self.endpoint(table_path)?;
        let started = std::time::Instant::now();
        let response = self
            .execute(|| self.http.post(url.clone()).json(query))
            .await?;
        let document: Value = read_json(response).await?;

        tracing::info!(
            table = table_path,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Fetched table data"
        );
        Ok(document)
    }

    /// Fetches a table and decodes the JSON-stat document.
    pub async fn fetch_and_parse(
        &self,
        table_path: &str,
        query: &PxQuery,
    ) -> Result<JsonStatDataset, StatFinError> {
        StatFinSource::fetch_and_parse(self, table_path, query).await
    }

    /// Sends a request, retrying according to the policy.
    async fn execute<F>(&self, build: F) -> Result<Response, StatFinError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_failure = AttemptFailure::Transport("no attempt made".to_string());

        for attempt in 0..=self.retry.max_retries {
            let failure = match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    match StatusClass::of(status) {
                        StatusClass::Success => return Ok(response),
                        StatusClass::RateLimited => AttemptFailure::RateLimited {
                            retry_after: response
                                .headers()
                                .get(RETRY_AFTER)
                                .and_then(|v| v.to_str().ok())
                                .and_then(parse_retry_after),
                        },
                        StatusClass::ServerError => AttemptFailure::Server {
                            status: status.as_u16(),
                        },
                        StatusClass::ClientError => {
                            let body = response.text().await.unwrap_or_default();
                            tracing::warn!(status = status.as_u16(), "StatFin rejected request");
                            return Err(StatFinError::Client {
                                status: status.as_u16(),
                                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
                            });
                        }
                    }
                }
                Err(e) if e.is_timeout() => AttemptFailure::Timeout,
                Err(e) => AttemptFailure::Transport(e.to_string()),
            };

            if attempt < self.retry.max_retries {
                let delay = self.retry.delay_for(attempt, &failure);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = self.retry.max_attempts(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    failure = ?failure,
                    "StatFin request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            last_failure = failure;
        }

        Err(last_failure.into_error(self.retry.max_attempts()))
    }
}

#[async_trait::async_trait]
impl StatFinSource for StatFinClient {
    async fn fetch_table(&self, table_path: &str, query: &PxQuery) -> Result<Value, StatFinError> {
        Self::fetch_table(self, table_path, query).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StatFinError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| StatFinError::Decode(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| StatFinError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
