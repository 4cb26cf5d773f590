//! Time-to-live fetch cache with stale-on-failure fallback.
//!
//! Entries map a resource key to the decoded payload and the instant it was
//! fetched. An entry older than the TTL is refreshed on the next `get`; if
//! that refresh fails for any reason (transport, status, malformed payload)
//! the previous payload is served instead. Entries are replaced wholesale,
//! never mutated, and never evicted.
//!
//! Each key has its own async gate so that concurrent misses for the same
//! key perform a single fetch.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::storage::EventSource;
use crate::utils::lock;

/// A cached payload and when it was fetched.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub key: String,
    pub payload: Arc<T>,
    pub fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Fetch cache for one payload type.
pub struct FetchCache<T> {
    source: Arc<dyn EventSource>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    gates: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> FetchCache<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(source: Arc<dyn EventSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            _payload: PhantomData,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the payload for `key`, fetching when absent or stale.
    ///
    /// Fails only when the fetch fails and nothing was ever cached for `key`.
    pub async fn get(&self, key: &str) -> Result<Arc<T>> {
        if let Some(payload) = self.fresh(key) {
            return Ok(payload);
        }

        let gate = self.gate(key);
        let _guard = gate.lock().await;

        // Another task may have refreshed while we waited
        if let Some(payload) = self.fresh(key) {
            return Ok(payload);
        }

        match self.fetch(key).await {
            Ok(payload) => {
                let payload = Arc::new(payload);
                self.store(key, Arc::clone(&payload));
                Ok(payload)
            }
            Err(error) => match self.peek(key) {
                Some(stale) => {
                    log::warn!("Serving stale {} after failed refresh: {}", key, error);
                    Ok(stale)
                }
                None => Err(error),
            },
        }
    }

    /// Cached payload for `key` regardless of age.
    pub fn peek(&self, key: &str) -> Option<Arc<T>> {
        lock(&self.entries)
            .get(key)
            .map(|entry| Arc::clone(&entry.payload))
    }

    /// Age of the cached entry for `key`.
    pub fn age(&self, key: &str) -> Option<Duration> {
        lock(&self.entries)
            .get(key)
            .map(|entry| entry.fetched_at.elapsed())
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fresh(&self, key: &str) -> Option<Arc<T>> {
        lock(&self.entries)
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| Arc::clone(&entry.payload))
    }

    fn gate(&self, key: &str) -> Arc<AsyncMutex<()>> {
        Arc::clone(lock(&self.gates).entry(key.to_string()).or_default())
    }

    async fn fetch(&self, key: &str) -> Result<T> {
        log::debug!("Fetching {}", key);
        let bytes = self.source.fetch(key).await?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::parse(key, e))
    }

    fn store(&self, key: &str, payload: Arc<T>) {
        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            fetched_at: Instant::now(),
        };
        lock(&self.entries).insert(key.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySource;
    use serde::Deserialize;
    use serde_json::json;

    const TTL: Duration = Duration::from_millis(300_000);
    const EPSILON: Duration = Duration::from_millis(1);

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        version: u32,
    }

    fn setup() -> (Arc<MemorySource>, FetchCache<Payload>) {
        let source = Arc::new(MemorySource::new());
        source.insert_json("a.json", &json!({"version": 1})).unwrap();
        let cache = FetchCache::new(source.clone() as Arc<dyn EventSource>, TTL);
        (source, cache)
    }

    #[tokio::test(start_paused = true)]
    async fn test_served_from_cache_until_ttl() {
        let (source, cache) = setup();

        let first = cache.get("a.json").await.unwrap();
        tokio::time::advance(TTL - EPSILON).await;
        let second = cache.get("a.json").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetch_count("a.json"), 1);

        tokio::time::advance(EPSILON * 2).await;
        cache.get("a.json").await.unwrap();
        assert_eq!(source.fetch_count("a.json"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_replaces_payload() {
        let (source, cache) = setup();
        cache.get("a.json").await.unwrap();

        source.insert_json("a.json", &json!({"version": 2})).unwrap();
        assert_eq!(cache.get("a.json").await.unwrap().version, 1);

        tokio::time::advance(TTL).await;
        assert_eq!(cache.get("a.json").await.unwrap().version, 2);
        assert_eq!(cache.age("a.json"), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_on_transport_failure() {
        let (source, cache) = setup();
        cache.get("a.json").await.unwrap();

        tokio::time::advance(TTL + EPSILON).await;
        source.fail("a.json");

        let payload = cache.get("a.json").await.unwrap();
        assert_eq!(payload.version, 1);
        assert_eq!(source.fetch_count("a.json"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_on_malformed_payload_leaves_entry_untouched() {
        let (source, cache) = setup();
        let original = cache.get("a.json").await.unwrap();

        tokio::time::advance(TTL + EPSILON).await;
        source.insert_raw("a.json", b"{not json".to_vec());

        let served = cache.get("a.json").await.unwrap();
        assert!(Arc::ptr_eq(&original, &served));
        assert!(Arc::ptr_eq(&original, &cache.peek("a.json").unwrap()));
    }

    #[tokio::test]
    async fn test_failure_without_entry_propagates() {
        let (source, cache) = setup();
        source.fail("a.json");
        assert!(cache.get("a.json").await.unwrap_err().is_retrieval());

        let err = cache.get("missing.json").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_without_entry_is_parse_error() {
        let (source, cache) = setup();
        source.insert_raw("bad.json", b"[1, 2".to_vec());
        assert!(matches!(
            cache.get("bad.json").await,
            Err(AppError::Parse { .. })
        ));

        // Valid JSON of the wrong shape is malformed too
        source.insert_json("shape.json", &json!({"version": "x"})).unwrap();
        assert!(matches!(
            cache.get("shape.json").await,
            Err(AppError::Parse { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_fetch_once() {
        let source = Arc::new(MemorySource::with_latency(Duration::from_millis(50)));
        source.insert_json("a.json", &json!({"version": 1})).unwrap();
        let cache = FetchCache::<Payload>::new(source.clone() as Arc<dyn EventSource>, TTL);

        let (a, b, c) = tokio::join!(
            cache.get("a.json"),
            cache.get("a.json"),
            cache.get("a.json")
        );

        assert_eq!(a.unwrap().version, 1);
        assert_eq!(b.unwrap().version, 1);
        assert_eq!(c.unwrap().version, 1);
        assert_eq!(source.fetch_count("a.json"), 1);
        assert_eq!(cache.len(), 1);
    }
}
