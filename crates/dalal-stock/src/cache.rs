//! Read-through caching for expensive provider calls
//!
//! Entries are keyed by (operation identity, serialized argument tuple) and
//! live for a fixed TTL (120 seconds by default). Two racing misses may both
//! invoke the underlying operation; the last write wins. That is acceptable:
//! the pipeline needs eventual convergence, not exactly-once.

use cached::{Cached, TimedSizedCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default TTL applied where a call site does not choose its own
pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

/// Cache key: which operation, with which arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Operation identity (e.g. "history", "quote", "news")
    pub operation: String,
    /// Arguments serialized to a canonical JSON string
    pub args: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(operation: impl Into<String>, args: impl Serialize) -> Self {
        Self {
            operation: operation.into(),
            args: serde_json::to_string(&args).unwrap_or_default(),
        }
    }
}

/// Thread-safe, TTL- and capacity-bounded result cache
pub struct ResultCache {
    store: Arc<RwLock<TimedSizedCache<CacheKey, serde_json::Value>>>,
}

impl ResultCache {
    /// Create a cache with the given TTL and capacity bound
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(TimedSizedCache::with_size_and_lifespan(
                capacity, ttl,
            ))),
        }
    }

    /// Create a cache with the default 120-second TTL
    pub fn with_default_ttl(capacity: usize) -> Self {
        Self::new(DEFAULT_TTL, capacity)
    }

    /// Get a non-expired value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let mut store = self.store.write().await;
        store.cache_get(key).cloned()
    }

    /// Insert a value, overwriting any previous entry for the key
    pub async fn insert(&self, key: CacheKey, value: serde_json::Value) {
        let mut store = self.store.write().await;
        let _ = store.cache_set(key, value);
    }

    /// Return the cached value, or invoke `fetch` and cache its result
    ///
    /// Expired entries are treated as absent and overwritten by the fresh
    /// result. Errors from `fetch` are returned as-is and nothing is cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> std::result::Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<serde_json::Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(operation = %key.operation, "cache hit");
            return Ok(value);
        }

        tracing::debug!(operation = %key.operation, "cache miss");

        let value = fetch().await?;
        self.insert(key, value.clone()).await;

        Ok(value)
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let store = self.store.read().await;
        store.cache_size()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        store.cache_clear();
    }
}

impl Clone for ResultCache {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Per-category caches with independent TTLs
pub struct CacheManager {
    /// Quote lookups
    pub quotes: ResultCache,
    /// Historical price series
    pub history: ResultCache,
    /// News search results
    pub news: ResultCache,
}

impl CacheManager {
    /// Create a manager with per-category TTLs and a shared capacity bound
    pub fn new(
        quotes_ttl: Duration,
        history_ttl: Duration,
        news_ttl: Duration,
        capacity: usize,
    ) -> Self {
        Self {
            quotes: ResultCache::new(quotes_ttl, capacity),
            history: ResultCache::new(history_ttl, capacity),
            news: ResultCache::new(news_ttl, capacity),
        }
    }

    /// Clear all caches
    pub async fn clear_all(&self) {
        self.quotes.clear().await;
        self.history.clear().await;
        self.news.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_key_serializes_args() {
        let key = CacheKey::new("history", ("RELIANCE.NS", "1y"));
        assert_eq!(key.operation, "history");
        assert!(key.args.contains("RELIANCE.NS"));
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = ResultCache::with_default_ttl(16);
        let key = CacheKey::new("quote", "TCS.NS");
        let value = serde_json::json!({"close": 3500.0});

        cache.insert(key.clone(), value.clone()).await;
        assert_eq!(cache.get(&key).await, Some(value));
    }

    #[tokio::test]
    async fn test_get_or_fetch_invokes_once_within_ttl() {
        let cache = ResultCache::with_default_ttl(16);
        let key = CacheKey::new("quote", "INFY.NS");
        let value = serde_json::json!({"close": 1500.0});

        let mut calls = 0;
        let result = cache
            .get_or_fetch(key.clone(), || {
                calls += 1;
                async { Ok::<_, String>(value.clone()) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(calls, 1);

        let result = cache
            .get_or_fetch(key.clone(), || {
                calls += 1;
                async { Ok::<_, String>(value.clone()) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(calls, 1, "second call within TTL must hit the cache");
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let cache = ResultCache::new(Duration::from_millis(50), 16);
        let key = CacheKey::new("quote", "SBIN.NS");

        let mut calls = 0;
        for _ in 0..2 {
            let _ = cache
                .get_or_fetch(key.clone(), || {
                    calls += 1;
                    async { Ok::<_, String>(serde_json::json!(1)) }
                })
                .await;
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        assert_eq!(calls, 2, "expired entry must invoke the operation again");
    }

    #[tokio::test]
    async fn test_fetch_error_caches_nothing() {
        let cache = ResultCache::with_default_ttl(16);
        let key = CacheKey::new("quote", "FAIL.NS");

        let result = cache
            .get_or_fetch(key.clone(), || async {
                Err::<serde_json::Value, _>("boom".to_string())
            })
            .await;
        assert!(result.is_err());
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_bound_evicts() {
        let cache = ResultCache::new(Duration::from_secs(60), 4);
        for i in 0..10 {
            cache
                .insert(CacheKey::new("quote", i), serde_json::json!(i))
                .await;
        }
        assert!(cache.len().await <= 4);
    }

    #[tokio::test]
    async fn test_manager_clear_all() {
        let manager = CacheManager::new(
            Duration::from_secs(120),
            Duration::from_secs(120),
            Duration::from_secs(120),
            16,
        );
        let key = CacheKey::new("quote", "ITC.NS");
        manager.quotes.insert(key.clone(), serde_json::json!(1)).await;
        manager.news.insert(key, serde_json::json!(2)).await;

        manager.clear_all().await;
        assert!(manager.quotes.is_empty().await);
        assert!(manager.news.is_empty().await);
    }
}
