//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where partitions are read from
    #[serde(default)]
    pub source: SourceConfig,

    /// Fetch cache behavior
    #[serde(default)]
    pub cache: CacheConfig,

    /// Query tuning
    #[serde(default)]
    pub query: QueryConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override selected values from `CALENDAR_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CALENDAR_BASE_URL") {
            self.source.base_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Ok(dir) = std::env::var("CALENDAR_DATA_DIR") {
            self.source.data_dir = PathBuf::from(dir);
        }
        if let Some(ttl) = env_number("CALENDAR_CACHE_TTL_MS") {
            self.cache.ttl_ms = ttl;
        }
        if let Some(days) = env_number("CALENDAR_RECENCY_DAYS") {
            self.query.recency_window_days = days;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.source.base_url {
            url::Url::parse(url)
                .map_err(|e| AppError::validation(format!("source.base_url '{url}': {e}")))?;
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.max_concurrent == 0 {
            return Err(AppError::validation("source.max_concurrent must be > 0"));
        }
        if self.cache.ttl_ms == 0 {
            return Err(AppError::validation("cache.ttl_ms must be > 0"));
        }
        if self.query.min_query_length == 0 {
            return Err(AppError::validation("query.min_query_length must be > 0"));
        }
        if !(1..=5).contains(&self.query.important_threshold) {
            return Err(AppError::validation(
                "query.important_threshold must be between 1 and 5",
            ));
        }
        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {name}={raw:?}: not a number");
            None
        }
    }
}

/// Partition source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the published data; HTTP mode when set
    #[serde(default)]
    pub base_url: Option<String>,

    /// Local data directory, used when no base URL is set
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent partition fetches per query
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            data_dir: defaults::data_dir(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Fetch cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in milliseconds
    #[serde(default = "defaults::ttl_ms")]
    pub ttl_ms: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: defaults::ttl_ms(),
        }
    }
}

/// Query tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Days before today still served from the current snapshot
    #[serde(default = "defaults::recency_window_days")]
    pub recency_window_days: u32,

    /// Archive months per platform scanned by historical search
    #[serde(default = "defaults::search_history_months")]
    pub search_history_months: usize,

    /// Minimum trimmed search term length, in characters
    #[serde(default = "defaults::min_query_length")]
    pub min_query_length: usize,

    /// Default importance threshold for the important-events view
    #[serde(default = "defaults::important_threshold")]
    pub important_threshold: u8,

    /// Cap on new events in the latest-events view
    #[serde(default = "defaults::new_events_limit")]
    pub new_events_limit: usize,

    /// Days ahead covered by the calendar view
    #[serde(default = "defaults::calendar_horizon_days")]
    pub calendar_horizon_days: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            recency_window_days: defaults::recency_window_days(),
            search_history_months: defaults::search_history_months(),
            min_query_length: defaults::min_query_length(),
            important_threshold: defaults::important_threshold(),
            new_events_limit: defaults::new_events_limit(),
            calendar_horizon_days: defaults::calendar_horizon_days(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Level filter for this run; `verbose` forces debug, an unknown level
    /// name falls back to info.
    pub fn level_filter(&self, verbose: bool) -> log::LevelFilter {
        if verbose {
            return log::LevelFilter::Debug;
        }
        self.level.trim().parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level {:?}, using info", self.level);
            log::LevelFilter::Info
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("docs/data")
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; invest-calendar/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_concurrent() -> usize {
        8
    }

    // Cache defaults
    pub fn ttl_ms() -> u64 {
        300_000
    }

    // Query defaults
    pub fn recency_window_days() -> u32 {
        7
    }
    pub fn search_history_months() -> usize {
        6
    }
    pub fn min_query_length() -> usize {
        2
    }
    pub fn important_threshold() -> u8 {
        4
    }
    pub fn new_events_limit() -> usize {
        100
    }
    pub fn calendar_horizon_days() -> u32 {
        30
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
