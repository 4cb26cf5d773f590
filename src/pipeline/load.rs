// src/pipeline/load.rs

use crate::error::Result;
use crate::models::{Period, PlatformSnapshot};
use crate::services::QueryEngine;

/// Load the current snapshots (`from == "current"`) or one archived month
/// (`from` as `YYYY-MM`).
pub async fn run_load(engine: &QueryEngine, from: &str) -> Result<Vec<PlatformSnapshot>> {
    let snapshots = if from == "current" {
        log::info!("Loading current snapshots...");
        engine.current_snapshots().await?
    } else {
        let period: Period = from.parse()?;
        log::info!("Loading archives for {}...", period);
        engine.load_month(period).await?
    };

    let total: usize = snapshots.iter().map(|s| s.events.len()).sum();
    log::info!(
        "Loaded {} events from {} partitions",
        total,
        snapshots.len()
    );
    for snapshot in &snapshots {
        log::info!(
            "  - {}: {} events (declared {})",
            snapshot.platform.display_name(),
            snapshot.events.len(),
            snapshot.total_events
        );
    }

    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Config, Platform};
    use crate::storage::MemorySource;
    use serde_json::json;
    use std::sync::Arc;

    fn engine() -> QueryEngine {
        let source = Arc::new(MemorySource::new());
        source
            .insert_json(
                "index.json",
                &json!({
                    "platforms": ["cls"],
                    "data_sources": {"historical": {"cls": [{"year": 2025, "month": 1}]}}
                }),
            )
            .unwrap();
        source
            .insert_json(
                "current/cls.json",
                &json!({"events": [{"event_date": "2025-03-10", "title": "CPI"}]}),
            )
            .unwrap();
        source
            .insert_json(
                "stacks/2025/01/cls.json",
                &json!({"events": [
                    {"event_date": "2025-01-10", "title": "PMI"},
                    {"event_date": "2025-01-20", "title": "LPR"}
                ]}),
            )
            .unwrap();
        QueryEngine::new(source, &Config::default())
    }

    #[tokio::test]
    async fn test_load_current_and_month() {
        let engine = engine();

        let current = run_load(&engine, "current").await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].events[0].platform, Platform::Cls);

        let month = run_load(&engine, "2025-01").await.unwrap();
        assert_eq!(month[0].events.len(), 2);

        // Months the index does not list read as nothing
        assert!(run_load(&engine, "2024-12").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_bad_selector() {
        let engine = engine();
        assert!(run_load(&engine, "2025").await.is_err());
        assert!(run_load(&engine, "2025-13").await.is_err());
    }
}
