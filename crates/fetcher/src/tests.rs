use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tilasto_core::catalog::{
    FetchConfigUpdate, FetchStatus, NewDataset, NewFetchConfig, Region,
};
use tilasto_core::dimension::{RegionLevel, TimeResolution};
use tilasto_core::filter::ApiQueryParams;
use tilasto_core::jsonstat::PxQuery;
use tilasto_shared::config::WorkerConfig;
use tilasto_shared::types::PageRequest;
use tilasto_statfin::{StatFinError, StatFinSource};
use tilasto_store::MemoryStore;
use tokio::sync::watch;

use super::*;

// ============================================================================
// Stub source
// ============================================================================

#[derive(Clone, Copy)]
enum Failure {
    NotFound,
    RateLimited,
}

#[derive(Default)]
struct StubSource {
    documents: HashMap<String, Value>,
    failures: HashMap<String, Failure>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    queries: Mutex<Vec<PxQuery>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubSource {
    fn with_document(mut self, table: &str, document: Value) -> Self {
        self.documents.insert(table.to_string(), document);
        self
    }

    fn with_failure(mut self, table: &str, failure: Failure) -> Self {
        self.failures.insert(table.to_string(), failure);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StatFinSource for StubSource {
    async fn fetch_table(&self, table_path: &str, query: &PxQuery) -> Result<Value, StatFinError> {
        self.calls.lock().unwrap().push(table_path.to_string());
        self.queries.lock().unwrap().push(query.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.failures.get(table_path) {
            Some(Failure::NotFound) => Err(StatFinError::Client {
                status: 404,
                message: "table not found".to_string(),
            }),
            Some(Failure::RateLimited) => Err(StatFinError::RateLimited { attempts: 4 }),
            None => self
                .documents
                .get(table_path)
                .cloned()
                .ok_or_else(|| StatFinError::Decode("no document".to_string())),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Population by year and region. `KU999` is not in the region table.
fn population() -> Value {
    json!({
        "version": "2.0",
        "class": "dataset",
        "id": ["Vuosi", "Alue", "Tiedot"],
        "size": [2, 3, 1],
        "dimension": {
            "Vuosi": {"label": "Vuosi", "category": {"index": {"2022": 0, "2023": 1}}},
            "Alue": {"label": "Alue", "category": {
                "index": {"SSS": 0, "KU091": 1, "KU999": 2},
                "label": {"SSS": "KOKO MAA", "KU091": "Helsinki", "KU999": "Lakkautettu"}
            }},
            "Tiedot": {"label": "Tiedot", "category": {
                "index": {"vaesto": 0},
                "label": {"vaesto": "Väkiluku"}
            }}
        },
        "value": [5563970, 658457, 1200, 5603851, 674500, null]
    })
}

fn region(code: &str, level: RegionLevel) -> Region {
    Region {
        code: code.to_string(),
        name_fi: code.to_string(),
        name_sv: None,
        name_en: None,
        region_level: level,
        parent_code: None,
        geometry_json: None,
    }
}

fn add_dataset(store: &MemoryStore, id: &str, priority: i32) -> i64 {
    store
        .create_dataset(NewDataset {
            id: id.to_string(),
            statfin_table_id: format!("{id}.px"),
            name_fi: id.to_string(),
            name_sv: None,
            name_en: None,
            description: None,
            source_url: None,
            time_resolution: TimeResolution::Year,
            has_region_dimension: true,
            has_industry_dimension: false,
        })
        .unwrap();
    let mut config = NewFetchConfig::new(id, format!("Fetch {id}"));
    config.priority = priority;
    store.create_fetch_config(config).unwrap().id
}

fn store() -> MemoryStore {
    let store = MemoryStore::new();
    store.upsert_regions([
        region("SSS", RegionLevel::Maakunta),
        region("KU091", RegionLevel::Kunta),
    ]);
    store
}

fn options() -> FetcherOptions {
    FetcherOptions {
        max_concurrent: 3,
        min_fetch_delay: Duration::ZERO,
    }
}

fn fetcher(source: StubSource, store: &MemoryStore) -> (Arc<StubSource>, DataFetcher<StubSource>) {
    let source = Arc::new(source);
    let fetcher = DataFetcher::new(Arc::clone(&source), store.clone(), options());
    (source, fetcher)
}

// ============================================================================
// DataFetcher
// ============================================================================

#[tokio::test]
async fn test_fetch_dataset_stores_rows_and_records_success() {
    let store = store();
    let config_id = add_dataset(&store, "vaesto", 0);
    let (_, fetcher) = fetcher(StubSource::default().with_document("vaesto.px", population()), &store);

    let result = fetcher.fetch_dataset("vaesto").await;

    assert!(result.success, "{result}");
    assert_eq!(result.records_fetched, 6);
    assert_eq!(result.records_inserted, 6);
    assert_eq!(result.records_updated, 0);
    assert_eq!(result.records_skipped, 0);
    assert_eq!(result.warnings, ["Unknown region code: KU999"]);

    let config = store.fetch_config(config_id).unwrap();
    assert_eq!(config.last_fetch_status, FetchStatus::Success);
    assert_eq!(config.fetch_count, 1);
    assert!(config.last_fetch_at.is_some());
    assert!(config.next_fetch_at.is_some());

    let helsinki = store
        .query_statistics(
            &ApiQueryParams {
                region_code: Some("KU091".to_string()),
                year: Some(2023),
                ..ApiQueryParams::default()
            },
            PageRequest::default(),
        )
        .await;
    assert_eq!(helsinki.items.len(), 1);
    assert_eq!(helsinki.items[0].value, Some(rust_decimal_macros::dec!(674500)));
    assert_eq!(helsinki.items[0].value_label.as_deref(), Some("Väkiluku"));

    let unknown = store
        .query_statistics(
            &ApiQueryParams {
                year: Some(2023),
                ..ApiQueryParams::default()
            },
            PageRequest::default(),
        )
        .await;
    assert!(unknown.items.iter().any(|s| s.region_code.is_none() && s.value.is_none()));
}

#[tokio::test]
async fn test_refetch_updates_in_place() {
    let store = store();
    add_dataset(&store, "vaesto", 0);
    let (_, fetcher) = fetcher(StubSource::default().with_document("vaesto.px", population()), &store);

    fetcher.fetch_dataset("vaesto").await;
    let second = fetcher.fetch_dataset("vaesto").await;

    assert!(second.success);
    assert_eq!(second.records_inserted, 0);
    assert_eq!(second.records_updated, 6);
    assert_eq!(store.statistic_count(Some("vaesto")).await, 6);
    assert_eq!(store.fetch_config_for_dataset("vaesto").unwrap().fetch_count, 2);
}

#[tokio::test]
async fn test_unknown_dataset_fails_without_fetching() {
    let store = store();
    let (source, fetcher) = fetcher(StubSource::default(), &store);

    let result = fetcher.fetch_dataset("missing").await;

    assert!(!result.success);
    assert_eq!(result.error_message.as_deref(), Some("Dataset not found: missing"));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_api_failure_is_recorded_on_config() {
    let store = store();
    let config_id = add_dataset(&store, "vaesto", 0);
    let (_, fetcher) = fetcher(
        StubSource::default().with_failure("vaesto.px", Failure::NotFound),
        &store,
    );

    let result = fetcher.fetch_dataset("vaesto").await;

    assert!(!result.success);
    let message = result.error_message.unwrap();
    assert!(message.starts_with("API error:"), "{message}");

    let config = store.fetch_config(config_id).unwrap();
    assert_eq!(config.last_fetch_status, FetchStatus::Failed);
    assert_eq!(config.fetch_count, 0);
    assert!(config.last_error_message.unwrap().contains("404"));
    assert!(config.next_fetch_at.is_some());
    assert_eq!(store.statistic_count(None).await, 0);
}

#[tokio::test]
async fn test_rate_limit_is_reported_as_such() {
    let store = store();
    add_dataset(&store, "vaesto", 0);
    let (_, fetcher) = fetcher(
        StubSource::default().with_failure("vaesto.px", Failure::RateLimited),
        &store,
    );

    let result = fetcher.fetch_dataset("vaesto").await;
    assert!(result.error_message.unwrap().starts_with("Rate limited:"));
}

#[tokio::test]
async fn test_query_override_is_sent() {
    let store = store();
    add_dataset(&store, "vaesto", 0);
    let (source, fetcher) = fetcher(StubSource::default().with_document("vaesto.px", population()), &store);

    let query = PxQuery::from_selections([("Vuosi", vec!["2023"])]);
    fetcher.fetch_dataset_with("vaesto", Some(&query)).await;
    fetcher.fetch_dataset("vaesto").await;

    let queries = source.queries.lock().unwrap().clone();
    assert_eq!(queries[0], query);
    assert_eq!(queries[1], PxQuery::all());
}

#[tokio::test]
async fn test_fetch_all_active_runs_due_configs_by_priority() {
    let store = store();
    add_dataset(&store, "low", 1);
    add_dataset(&store, "high", 10);
    let paused = add_dataset(&store, "paused", 50);
    store
        .update_fetch_config(
            paused,
            FetchConfigUpdate {
                is_active: Some(false),
                ..FetchConfigUpdate::default()
            },
        )
        .unwrap();
    let source = StubSource::default()
        .with_document("low.px", population())
        .with_document("high.px", population())
        .with_document("paused.px", population());
    let (source, fetcher) = fetcher(source, &store);

    let results = fetcher.fetch_all_active(false).await;
    assert_eq!(results.len(), 2);
    assert_eq!(source.calls(), ["high.px", "low.px"]);

    // Both are now scheduled a day ahead.
    assert!(fetcher.fetch_all_active(false).await.is_empty());

    let forced = fetcher.fetch_all_active(true).await;
    assert_eq!(forced.len(), 2);
}

#[tokio::test]
async fn test_fetch_by_config_id() {
    let store = store();
    let id = add_dataset(&store, "vaesto", 0);
    let (_, fetcher) = fetcher(StubSource::default().with_document("vaesto.px", population()), &store);

    assert!(fetcher.fetch_by_config_id(id).await.success);

    let missing = fetcher.fetch_by_config_id(999).await;
    assert_eq!(missing.dataset_id, "unknown");
    assert_eq!(missing.error_message.as_deref(), Some("FetchConfig not found: 999"));
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let store = store();
    let mut source = StubSource {
        delay: Duration::from_millis(50),
        ..StubSource::default()
    };
    let mut ids = Vec::new();
    for i in 0..5 {
        let id = format!("d{i}");
        add_dataset(&store, &id, 0);
        source = source.with_document(&format!("{id}.px"), population());
        ids.push(id);
    }
    let source = Arc::new(source);
    let fetcher = DataFetcher::new(
        Arc::clone(&source),
        store.clone(),
        FetcherOptions {
            max_concurrent: 2,
            min_fetch_delay: Duration::ZERO,
        },
    );

    let results = fetcher.fetch_datasets(&ids).await;

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_config_update_during_fetch_is_kept() {
    let store = store();
    let config_id = add_dataset(&store, "vaesto", 0);
    let source = StubSource {
        delay: Duration::from_millis(200),
        ..StubSource::default()
    }
    .with_document("vaesto.px", population());
    let (_, fetcher) = fetcher(source, &store);

    let deactivate = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store
            .update_fetch_config(
                config_id,
                FetchConfigUpdate {
                    is_active: Some(false),
                    priority: Some(9),
                    ..FetchConfigUpdate::default()
                },
            )
            .unwrap();
    };
    let (result, ()) = tokio::join!(fetcher.fetch_dataset("vaesto"), deactivate);

    assert!(result.success, "{result}");
    let config = store.fetch_config(config_id).unwrap();
    assert!(!config.is_active);
    assert_eq!(config.priority, 9);
    assert_eq!(config.fetch_count, 1);
    assert_eq!(config.last_fetch_status, FetchStatus::Success);
}

#[tokio::test]
async fn test_concurrent_fetches_of_one_dataset_count_both() {
    let store = store();
    let config_id = add_dataset(&store, "vaesto", 0);
    let source = StubSource {
        delay: Duration::from_millis(50),
        ..StubSource::default()
    }
    .with_document("vaesto.px", population());
    let (source, fetcher) = fetcher(source, &store);

    let results = fetcher
        .fetch_datasets(&["vaesto".to_string(), "vaesto".to_string()])
        .await;

    assert!(results.iter().all(|r| r.success));
    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 2);
    assert_eq!(store.fetch_config(config_id).unwrap().fetch_count, 2);
}

#[test]
fn test_options_from_config() {
    let config = WorkerConfig {
        max_concurrent: 0,
        min_fetch_delay_ms: 250,
        ..WorkerConfig::default()
    };
    let options = FetcherOptions::from_config(&config);
    assert_eq!(options.max_concurrent, 1);
    assert_eq!(options.min_fetch_delay, Duration::from_millis(250));
}

// ============================================================================
// Scheduler
// ============================================================================

#[tokio::test]
async fn test_scheduler_runs_immediately_and_stops_on_signal() {
    let store = store();
    add_dataset(&store, "vaesto", 0);
    let (source, fetcher) = fetcher(StubSource::default().with_document("vaesto.px", population()), &store);
    let scheduler = Arc::new(Scheduler::new(Arc::new(fetcher), Duration::from_secs(3600)));

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run(rx).await }
    });

    tokio::time::timeout(Duration::from_secs(5), async {
        while source.calls().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    tx.send(true).unwrap();
    let runs = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(runs, 1);
    assert_eq!(store.statistic_count(None).await, 6);
}

#[tokio::test]
async fn test_scheduler_already_stopped() {
    let store = store();
    let (_, fetcher) = fetcher(StubSource::default(), &store);
    let scheduler = Scheduler::new(Arc::new(fetcher), Duration::from_secs(60));

    let (_tx, rx) = watch::channel(true);
    assert_eq!(scheduler.run(rx).await, 0);
}

#[tokio::test]
async fn test_scheduler_stops_when_sender_dropped() {
    let store = store();
    let (_, fetcher) = fetcher(StubSource::default(), &store);
    let scheduler = Scheduler::new(Arc::new(fetcher), Duration::from_secs(3600));

    let (tx, rx) = watch::channel(false);
    drop(tx);
    let runs = tokio::time::timeout(Duration::from_secs(5), scheduler.run(rx))
        .await
        .unwrap();
    assert!(runs <= 1);
}

#[tokio::test]
async fn test_run_job_summarizes_failures() {
    let store = store();
    add_dataset(&store, "ok", 1);
    add_dataset(&store, "broken", 0);
    let source = StubSource::default()
        .with_document("ok.px", population())
        .with_failure("broken.px", Failure::NotFound);
    let (_, fetcher) = fetcher(source, &store);
    let scheduler = Scheduler::new(Arc::new(fetcher), Duration::from_secs(60));

    let summary = scheduler.run_job().await;

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.records_inserted, 6);
    assert!(summary.errors[0].starts_with("broken: API error"));
    assert!(!summary.is_clean());
}

#[tokio::test]
async fn test_trigger_now_forces_run() {
    let store = store();
    add_dataset(&store, "vaesto", 0);
    let (source, fetcher) = fetcher(StubSource::default().with_document("vaesto.px", population()), &store);
    let scheduler = Scheduler::new(Arc::new(fetcher), Duration::from_secs(60));

    assert_eq!(scheduler.run_job().await.attempted, 1);
    assert_eq!(scheduler.run_job().await.attempted, 0);

    let forced = scheduler.trigger_now(None).await;
    assert_eq!(forced.len(), 1);
    let single = scheduler.trigger_now(Some("vaesto")).await;
    assert!(single[0].success);
    assert_eq!(source.calls().len(), 3);
}

#[test]
fn test_scheduler_interval_from_config() {
    let store = store();
    let (_, fetcher) = fetcher(StubSource::default(), &store);
    let fetcher = Arc::new(fetcher);

    let config = WorkerConfig {
        fetch_interval_hours: 6,
        ..WorkerConfig::default()
    };
    let scheduler = Scheduler::from_config(Arc::clone(&fetcher), &config);
    assert_eq!(scheduler.interval(), Duration::from_secs(6 * 3600));

    let zero = Scheduler::new(fetcher, Duration::ZERO);
    assert_eq!(zero.interval(), Duration::from_millis(1));
}
