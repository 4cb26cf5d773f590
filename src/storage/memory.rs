//! In-memory source.
//!
//! Serves resources from a map and records how often each key was fetched.
//! Keys can be switched into a failing state to simulate an outage.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::storage::EventSource;
use crate::utils::lock;

#[derive(Debug, Default)]
pub struct MemorySource {
    resources: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
    fetches: Mutex<HashMap<String, usize>>,
    latency: Option<Duration>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch by `latency` (a suspension point, not a block).
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Store raw bytes under `key`.
    pub fn insert_raw(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        lock(&self.resources).insert(key.into(), bytes.into());
    }

    /// Store `value` serialized as JSON under `key`.
    pub fn insert_json<T: Serialize>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.insert_raw(key, bytes);
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        lock(&self.resources).remove(key);
    }

    /// Make fetches of `key` fail with a retrieval error.
    pub fn fail(&self, key: impl Into<String>) {
        lock(&self.failing).insert(key.into());
    }

    /// Undo `fail`.
    pub fn recover(&self, key: &str) {
        lock(&self.failing).remove(key);
    }

    /// Number of fetch attempts for `key`, failed ones included.
    pub fn fetch_count(&self, key: &str) -> usize {
        lock(&self.fetches).get(key).copied().unwrap_or(0)
    }

    /// Number of fetch attempts across all keys.
    pub fn total_fetches(&self) -> usize {
        lock(&self.fetches).values().sum()
    }
}

#[async_trait]
impl EventSource for MemorySource {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        *lock(&self.fetches).entry(key.to_string()).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if lock(&self.failing).contains(key) {
            return Err(AppError::retrieval(key, "simulated outage"));
        }

        lock(&self.resources)
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(key))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_and_failures() {
        let source = MemorySource::new();
        source.insert_raw("a.json", b"{}".to_vec());

        assert!(source.fetch("a.json").await.is_ok());
        assert!(source.fetch("missing.json").await.unwrap_err().is_not_found());

        source.fail("a.json");
        let err = source.fetch("a.json").await.unwrap_err();
        assert!(err.is_retrieval() && !err.is_not_found());

        source.recover("a.json");
        assert!(source.fetch("a.json").await.is_ok());

        assert_eq!(source.fetch_count("a.json"), 3);
        assert_eq!(source.total_fetches(), 4);
    }
}
