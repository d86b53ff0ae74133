//! Fixed-TTL memoization for expensive read endpoints
//!
//! Entries carry their own expiry and are pruned lazily on lookup. There is
//! no invalidation besides expiry, so readers may see data up to one TTL old.

use std::{
    collections::HashMap,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

use crate::error::AppResult;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Shared key-value memo; clones point at the same entries
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: self.entries.clone(),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fresh value for `key`, dropping it if it has expired
    pub async fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        None
    }

    pub async fn set(&self, key: &str, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry::new(value, self.ttl));
    }

    /// Cached value for `key`, or compute, store and return it. Errors are
    /// not cached.
    pub async fn get_or_try_insert<F, Fut>(&self, key: &str, compute: F) -> AppResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<V>>,
    {
        if let Some(value) = self.get(key).await {
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }
        let value = compute().await?;
        self.set(key, value.clone()).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_get_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("summary", 3).await;
        assert_eq!(cache.get("summary").await, Some(3));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_pruned() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.set("summary", 3).await;
        assert_eq!(cache.get("summary").await, None);
        assert!(cache.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let handle = cache.clone();
        handle.set("subjects", vec!["FIC"]).await;
        assert_eq!(cache.get("subjects").await, Some(vec!["FIC"]));
    }

    #[tokio::test]
    async fn test_get_or_try_insert_memoizes_success_only() {
        let cache = TtlCache::new(Duration::from_secs(60));

        let failed = cache
            .get_or_try_insert("k", || async { Err(AppError::Internal("boom".into())) })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.get("k").await, None);

        let first = cache.get_or_try_insert("k", || async { Ok(1) }).await.unwrap();
        let second = cache.get_or_try_insert("k", || async { Ok(2) }).await.unwrap();
        assert_eq!((first, second), (1, 1));
    }
}
