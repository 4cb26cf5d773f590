// src/pipeline/summary.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::models::{ChangeReport, Metadata, Platform};
use crate::services::{PlatformStats, QueryEngine, aggregate};

/// Dataset overview for one day.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub date: NaiveDate,
    pub metadata: Arc<Metadata>,
    pub change_report: Option<Arc<ChangeReport>>,
    pub platforms: BTreeMap<Platform, PlatformStats>,
}

/// Collect metadata, the change report for `date`, and per-platform counts
/// over the current snapshots.
pub async fn run_summary(engine: &QueryEngine, date: NaiveDate) -> Result<Summary> {
    let metadata = engine.loader().load_metadata().await?;
    log::info!(
        "Dataset: {} events, last updated {}",
        metadata.total_events,
        metadata.last_updated.as_deref().unwrap_or("unknown")
    );

    let change_report = engine.loader().load_change_report(date).await?;
    match &change_report {
        Some(report) if report.summary.has_changes() => log::info!(
            "Changes on {}: {} new, {} updated, {} cancelled",
            date,
            report.summary.total_new,
            report.summary.total_updated,
            report.summary.total_cancelled
        ),
        Some(_) => log::info!("No changes detected on {}", date),
        None => log::warn!("No change report for {}", date),
    }

    let snapshots = engine.current_snapshots().await?;
    let platforms = aggregate::platform_stats(&snapshots);
    for (platform, stats) in &platforms {
        log::info!(
            "  - {} ({}): {} events, {} new",
            stats.name,
            platform,
            stats.total_events,
            stats.new_events
        );
    }

    Ok(Summary {
        date,
        metadata,
        change_report,
        platforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;
    use crate::storage::MemorySource;
    use serde_json::json;

    fn seeded() -> Arc<MemorySource> {
        let source = Arc::new(MemorySource::new());
        source
            .insert_json("index.json", &json!({"platforms": ["cls", "investing"]}))
            .unwrap();
        source
            .insert_json(
                "metadata.json",
                &json!({
                    "collection_time": "2025-03-10T08:00:00",
                    "total_events": 3,
                    "platforms": {"cls": {"name": "财联社", "event_count": 2}}
                }),
            )
            .unwrap();
        source
            .insert_json(
                "current/cls.json",
                &json!({"events": [
                    {"event_date": "2025-03-10", "title": "CPI", "is_new": true},
                    {"event_date": "2025-03-11", "title": "PPI"}
                ]}),
            )
            .unwrap();
        source
            .insert_json(
                "current/investing.json",
                &json!({"events": [{"event_date": "2025-03-10", "title": "NFP"}]}),
            )
            .unwrap();
        source
    }

    #[tokio::test]
    async fn test_summary_without_change_report() {
        let engine = QueryEngine::new(seeded(), &Config::default());
        let summary = run_summary(&engine, "2025-03-10".parse().unwrap())
            .await
            .unwrap();

        assert!(summary.change_report.is_none());
        assert_eq!(
            summary.metadata.last_updated.as_deref(),
            Some("2025-03-10T08:00:00")
        );
        assert_eq!(summary.platforms[&Platform::Cls].total_events, 2);
        assert_eq!(summary.platforms[&Platform::Cls].new_events, 1);
        assert_eq!(summary.platforms[&Platform::Investing].total_events, 1);
    }

    #[tokio::test]
    async fn test_summary_with_change_report() {
        let source = seeded();
        source
            .insert_json(
                "reports/change_report_2025-03-10.json",
                &json!({
                    "summary": {"total_new": 1, "total_updated": 0, "total_cancelled": 0},
                    "top_new_events": [{"platform": "cls", "event_date": "2025-03-10", "title": "CPI"}]
                }),
            )
            .unwrap();
        let engine = QueryEngine::new(source, &Config::default());

        let summary = run_summary(&engine, "2025-03-10".parse().unwrap())
            .await
            .unwrap();
        let report = summary.change_report.unwrap();
        assert!(report.summary.has_changes());
        assert_eq!(report.top_new_events[0].title, "CPI");
    }

    #[tokio::test]
    async fn test_summary_requires_metadata() {
        let source = seeded();
        source.remove("metadata.json");
        let engine = QueryEngine::new(source, &Config::default());
        assert!(run_summary(&engine, "2025-03-10".parse().unwrap()).await.is_err());
    }
}
