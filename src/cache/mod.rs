//! Key/value cache used as a read accelerator for product listings.
//!
//! Nothing here carries a correctness obligation: entries may be stale until
//! their TTL runs out, and every failure is reported to the caller, which is
//! expected to fall back to the database.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

mod redis_backend;

pub use redis_backend::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
    /// Removes every key starting with `prefix`, returning how many were dropped.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError>;
    async fn ping(&self) -> Result<(), CacheError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires_at| Instant::now() > expires_at)
            .unwrap_or(false)
    }
}

/// Process-local cache with per-entry TTL, used in development, in tests and
/// when Redis cannot be reached.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let store = self.store.read().await;
            match store.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        self.store.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.store
            .write()
            .await
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let store = self.store.read().await;
        Ok(store.get(key).map(|e| !e.is_expired()).unwrap_or(false))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|key, _| !key.starts_with(prefix));
        Ok(before - store.len())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

const PRODUCT_LIST_PREFIX: &str = "products:";

/// Cache-aside wrapper for paginated product listings.
#[derive(Clone)]
pub struct ProductListCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl ProductListCache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub fn key(offset: u64, limit: u64, search: Option<&str>) -> String {
        format!(
            "{}{}-{}-{}",
            PRODUCT_LIST_PREFIX,
            offset,
            limit,
            search.unwrap_or_default()
        )
    }

    /// Returns the cached page for `key`, or `None` on a miss.
    pub async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        if !self.backend.exists(key).await? {
            debug!(key, "product list cache miss");
            return Ok(None);
        }
        match self.backend.get(key).await? {
            Some(raw) => {
                debug!(key, "product list cache hit");
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    pub async fn store<T: Serialize>(&self, key: &str, page: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(page)?;
        self.backend.set(key, &raw, Some(self.ttl)).await
    }

    /// Drops every cached listing. Failures are logged and swallowed.
    pub async fn invalidate(&self) {
        match self.backend.delete_prefix(PRODUCT_LIST_PREFIX).await {
            Ok(dropped) => debug!(dropped, "product list cache invalidated"),
            Err(e) => warn!(error = %e, "failed to invalidate product list cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Page {
        items: Vec<String>,
    }

    #[tokio::test]
    async fn in_memory_entries_expire() {
        let cache = InMemoryCache::new();
        cache
            .set("k", "v", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!cache.exists("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_prefix_only_touches_matching_keys() {
        let cache = InMemoryCache::new();
        cache.set("products:0-10-", "a", None).await.unwrap();
        cache.set("products:10-10-", "b", None).await.unwrap();
        cache.set("brands:0-10-", "c", None).await.unwrap();

        assert_eq!(cache.delete_prefix("products:").await.unwrap(), 2);
        assert!(cache.exists("brands:0-10-").await.unwrap());
    }

    #[test]
    fn product_list_key_encodes_query() {
        assert_eq!(ProductListCache::key(0, 10, None), "products:0-10-");
        assert_eq!(
            ProductListCache::key(20, 5, Some("trek")),
            "products:20-5-trek"
        );
    }

    #[tokio::test]
    async fn product_list_cache_round_trip_and_invalidate() {
        let cache = ProductListCache::new(Arc::new(InMemoryCache::new()), Duration::from_secs(60));
        let key = ProductListCache::key(0, 10, None);
        assert_eq!(cache.fetch::<Page>(&key).await.unwrap(), None);

        let page = Page {
            items: vec!["Trek 820".into()],
        };
        cache.store(&key, &page).await.unwrap();
        assert_eq!(cache.fetch::<Page>(&key).await.unwrap(), Some(page));

        cache.invalidate().await;
        assert_eq!(cache.fetch::<Page>(&key).await.unwrap(), None);
    }
}
