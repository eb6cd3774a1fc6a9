//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
///
/// Every section has defaults, so an empty environment yields a working
/// configuration pointed at the public StatFin API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// StatFin API configuration.
    #[serde(default)]
    pub statfin: StatFinConfig,
    /// Background worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// StatFin PxWeb API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StatFinConfig {
    /// Base URL of the StatFin database.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry attempts after the first failed request.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Time-to-live for cached table listings and metadata.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_base_url() -> String {
    "https://pxdata.stat.fi/PxWeb/api/v1/fi/StatFin".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_cache_ttl_secs() -> u64 {
    3600 // 1 hour
}

impl Default for StatFinConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Background worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Hours between scheduled fetch jobs.
    #[serde(default = "default_fetch_interval_hours")]
    pub fetch_interval_hours: u64,
    /// Maximum number of datasets fetched at the same time.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Pause between consecutive dataset fetches in milliseconds.
    #[serde(default = "default_min_fetch_delay_ms")]
    pub min_fetch_delay_ms: u64,
    /// Optional JSON catalog used to seed the store on startup.
    #[serde(default)]
    pub catalog_path: Option<String>,
}

fn default_fetch_interval_hours() -> u64 {
    24
}

fn default_max_concurrent() -> usize {
    3
}

fn default_min_fetch_delay_ms() -> u64 {
    1000
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            fetch_interval_hours: default_fetch_interval_hours(),
            max_concurrent: default_max_concurrent(),
            min_fetch_delay_ms: default_min_fetch_delay_ms(),
            catalog_path: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TILASTO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
