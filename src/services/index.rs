//! Partition index service.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::models::{PartitionIndex, Period};
use crate::storage::{EventSource, FetchCache, paths};

/// Lazily loaded view of `index.json`, refreshed through the fetch cache.
pub struct IndexService {
    cache: FetchCache<PartitionIndex>,
}

impl IndexService {
    pub fn new(source: Arc<dyn EventSource>, ttl: Duration) -> Self {
        Self {
            cache: FetchCache::new(source, ttl),
        }
    }

    /// Known platforms and their archived months.
    ///
    /// The index is a required resource: without a cached copy, a failed
    /// fetch is returned to the caller.
    pub async fn load(&self) -> Result<Arc<PartitionIndex>> {
        self.cache.get(paths::INDEX).await
    }

    /// Distinct archived months across all platforms, ascending.
    pub async fn list_available_periods(&self) -> Result<Vec<Period>> {
        Ok(self.load().await?.available_periods())
    }
}
