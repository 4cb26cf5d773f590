// src/pipeline/validate.rs

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::QueryEngine;

/// Validate configuration, then check that the index and every listed
/// platform's current snapshot can be read.
pub async fn run_validate(config: &Config, engine: &QueryEngine) -> Result<()> {
    log::info!("Validating configuration...");
    config.validate()?;
    log::info!("Config OK");
    log::info!(
        "  - source: {}",
        config
            .source
            .base_url
            .clone()
            .unwrap_or_else(|| config.source.data_dir.display().to_string())
    );
    log::info!("  - cache ttl: {} ms", config.cache.ttl_ms);
    log::info!(
        "  - recency window: {} days",
        config.query.recency_window_days
    );

    let index = engine.index().load().await?;
    log::info!(
        "Index OK: {} platforms, {} archived months",
        index.platforms().len(),
        index.available_periods().len()
    );

    let mut failed = Vec::new();
    for platform in index.platforms() {
        match engine.loader().load_current(platform).await {
            Ok(snapshot) => log::info!(
                "  - {}: {} events",
                platform.display_name(),
                snapshot.events.len()
            ),
            Err(e) => {
                log::error!("  - {}: {}", platform.display_name(), e);
                failed.push(platform.to_string());
            }
        }
    }

    if !failed.is_empty() {
        return Err(AppError::validation(format!(
            "Unreadable current snapshots: {}",
            failed.join(", ")
        )));
    }

    log::info!("All validations passed!");
    Ok(())
}
