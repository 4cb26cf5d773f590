//! Partition loader.
//!
//! Fetches current snapshots, monthly archives, metadata and change reports
//! through the fetch cache, and decides which failures are fatal:
//! - current snapshot, metadata: required, errors propagate
//! - monthly archive: optional, any failure reads as an empty archive
//! - change report: a missing report is `None`, other failures propagate

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{ChangeReport, Metadata, Period, Platform, PlatformSnapshot};
use crate::storage::{EventSource, FetchCache, paths};

pub struct PartitionLoader {
    snapshots: FetchCache<PlatformSnapshot>,
    metadata: FetchCache<Metadata>,
    reports: FetchCache<ChangeReport>,
}

impl PartitionLoader {
    pub fn new(source: Arc<dyn EventSource>, ttl: Duration) -> Self {
        Self {
            snapshots: FetchCache::new(Arc::clone(&source), ttl),
            metadata: FetchCache::new(Arc::clone(&source), ttl),
            reports: FetchCache::new(source, ttl),
        }
    }

    /// Load a platform's current snapshot.
    pub async fn load_current(&self, platform: &Platform) -> Result<PlatformSnapshot> {
        let snapshot = self.snapshots.get(&paths::current(platform)).await?;
        Ok(snapshot.as_ref().clone().assign(platform))
    }

    /// Load one archived month; a missing or unreadable archive is empty.
    pub async fn load_historical(
        &self,
        platform: &Platform,
        year: i32,
        month: u32,
    ) -> PlatformSnapshot {
        let period = Period::new(year, month);
        if !period.is_valid() {
            log::debug!("No archive can exist for {} {}", platform, period);
            return PlatformSnapshot::empty(platform.clone());
        }

        let key = paths::historical(platform, period);
        match self.snapshots.get(&key).await {
            Ok(snapshot) => snapshot.as_ref().clone().assign(platform),
            Err(error) => {
                Self::log_downgrade(&key, &error);
                PlatformSnapshot::empty(platform.clone())
            }
        }
    }

    /// Archive probe for fan-out queries.
    pub async fn probe_historical(&self, platform: &Platform, period: Period) -> PlatformSnapshot {
        self.load_historical(platform, period.year, period.month)
            .await
    }

    /// Current snapshot for fan-out queries; failures read as empty.
    pub async fn probe_current(&self, platform: &Platform) -> PlatformSnapshot {
        match self.load_current(platform).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                Self::log_downgrade(&paths::current(platform), &error);
                PlatformSnapshot::empty(platform.clone())
            }
        }
    }

    /// Dataset metadata.
    pub async fn load_metadata(&self) -> Result<Arc<Metadata>> {
        self.metadata.get(paths::METADATA).await
    }

    /// Change report for one day, if the collector wrote one.
    pub async fn load_change_report(&self, date: NaiveDate) -> Result<Option<Arc<ChangeReport>>> {
        match self.reports.get(&paths::change_report(date)).await {
            Ok(report) => Ok(Some(report)),
            Err(AppError::NotFound { resource }) => {
                log::info!("No change report at {}", resource);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    fn log_downgrade(key: &str, error: &AppError) {
        if error.is_not_found() {
            log::debug!("Partition {} does not exist, treating as empty", key);
        } else {
            log::warn!("Partition {} unavailable, treating as empty: {}", key, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySource;
    use serde_json::json;

    fn loader() -> (Arc<MemorySource>, PartitionLoader) {
        let source = Arc::new(MemorySource::new());
        let loader = PartitionLoader::new(source.clone(), Duration::from_secs(300));
        (source, loader)
    }

    #[tokio::test]
    async fn test_load_current_stamps_platform() {
        let (source, loader) = loader();
        source
            .insert_json(
                "current/cls.json",
                &json!({"total_events": 1, "events": [{"event_date": "2025-03-01", "title": "GDP"}]}),
            )
            .unwrap();

        let snapshot = loader.load_current(&Platform::Cls).await.unwrap();
        assert_eq!(snapshot.platform, Platform::Cls);
        assert_eq!(snapshot.events[0].platform, Platform::Cls);
    }

    #[tokio::test]
    async fn test_missing_current_propagates() {
        let (_source, loader) = loader();
        let err = loader.load_current(&Platform::Cls).await.unwrap_err();
        assert!(err.is_retrieval());

        let probed = loader.probe_current(&Platform::Cls).await;
        assert!(probed.is_empty());
    }

    #[tokio::test]
    async fn test_missing_or_invalid_archive_is_empty() {
        let (source, loader) = loader();

        let snapshot = loader.load_historical(&Platform::Cls, 2024, 13).await;
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_events, 0);
        assert_eq!(source.total_fetches(), 0);

        let snapshot = loader.load_historical(&Platform::Cls, 2019, 1).await;
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.platform, Platform::Cls);
    }

    #[tokio::test]
    async fn test_failed_or_malformed_archive_is_empty() {
        let (source, loader) = loader();
        source.fail("stacks/2025/01/cls.json");
        source.insert_raw("stacks/2025/02/cls.json", b"<html>".to_vec());

        assert!(loader.load_historical(&Platform::Cls, 2025, 1).await.is_empty());
        assert!(loader.load_historical(&Platform::Cls, 2025, 2).await.is_empty());
    }

    #[tokio::test]
    async fn test_change_report_absence_is_none() {
        let (source, loader) = loader();
        let day: NaiveDate = "2025-03-09".parse().unwrap();
        assert!(loader.load_change_report(day).await.unwrap().is_none());

        source
            .insert_json(
                "reports/change_report_2025-03-09.json",
                &json!({"summary": {"total_new": 2}}),
            )
            .unwrap();
        let next_day = day.succ_opt().unwrap();
        source
            .insert_json(
                "reports/change_report_2025-03-10.json",
                &json!({"summary": {"total_new": 2}}),
            )
            .unwrap();
        let report = loader.load_change_report(next_day).await.unwrap().unwrap();
        assert_eq!(report.summary.total_new, 2);

        source.fail("reports/change_report_2025-03-11.json");
        assert!(
            loader
                .load_change_report(next_day.succ_opt().unwrap())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_metadata_is_required() {
        let (source, loader) = loader();
        assert!(loader.load_metadata().await.is_err());

        source
            .insert_json("metadata.json", &json!({"total_events": 7, "platforms": {}}))
            .unwrap();
        assert_eq!(loader.load_metadata().await.unwrap().total_events, 7);
    }
}
