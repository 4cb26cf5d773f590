//! Read-only access to published event partitions.
//!
//! Partitions follow the Hot/Cold layout written by the collector:
//! - Hot Data: `current/{platform}.json` - rolling near-term snapshot
//! - Cold Data: `stacks/YYYY/MM/{platform}.json` - immutable monthly archives
//!
//! ## Directory Structure
//!
//! ```text
//! {root}/
//! ├── index.json            # Platforms + archived months
//! ├── metadata.json         # Dataset summary
//! ├── current/              # Hot: one snapshot per platform
//! │   ├── cls.json
//! │   └── investing.json
//! ├── stacks/               # Cold: Immutable Archives
//! │   └── YYYY/
//! │       └── MM/
//! │           └── {platform}.json
//! └── reports/
//!     └── change_report_YYYY-MM-DD.json
//! ```

pub mod cache;
pub mod http;
pub mod local;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SourceConfig;

// Re-export for convenience
pub use cache::{CacheEntry, FetchCache};
pub use http::HttpSource;
pub use local::LocalSource;
pub use memory::MemorySource;

/// Transport that resolves a logical resource key to raw bytes.
///
/// Implementations report a missing resource as `AppError::NotFound` and
/// every other failure as `AppError::Retrieval`.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the bytes stored under `key`.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>>;

    /// Location description for logs.
    fn describe(&self) -> String;
}

/// Build the source selected by configuration: HTTP when a base URL is
/// set, the local data directory otherwise.
pub fn source_from_config(config: &SourceConfig) -> Result<Arc<dyn EventSource>> {
    let source: Arc<dyn EventSource> = match &config.base_url {
        Some(_) => Arc::new(HttpSource::new(config)?),
        None => Arc::new(LocalSource::new(&config.data_dir)),
    };
    log::info!("Reading partitions from {}", source.describe());
    Ok(source)
}

/// Logical resource keys.
pub mod paths {
    use chrono::NaiveDate;

    use crate::models::{Period, Platform};

    pub const INDEX: &str = "index.json";
    pub const METADATA: &str = "metadata.json";

    /// Current snapshot key for a platform.
    pub fn current(platform: &Platform) -> String {
        format!("current/{}.json", platform)
    }

    /// Archive key for a given platform and month.
    pub fn historical(platform: &Platform, period: Period) -> String {
        format!(
            "stacks/{}/{:02}/{}.json",
            period.year, period.month, platform
        )
    }

    /// Change report key for a given day.
    pub fn change_report(date: NaiveDate) -> String {
        format!("reports/change_report_{}.json", date.format("%Y-%m-%d"))
    }
}
