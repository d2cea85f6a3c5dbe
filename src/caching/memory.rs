//! In-memory response cache with optional file persistence.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::caching::store::{CacheError, CacheKey, CachedResponse, ResponseCache};
use crate::observability::metrics;

/// A stored response with its absolute expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub response: CachedResponse,
    /// Unix seconds when the entry was stored.
    pub stored_at: i64,
    /// Unix seconds after which the entry is dead.
    pub expires_at: i64,
}

impl CacheEntry {
    /// Check if the entry is still live at `now` (Unix seconds).
    pub fn is_fresh_at(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

/// A thread-safe response cache.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Arc<DashMap<CacheKey, CacheEntry>>,
    max_entries: usize,
    persistence_path: Option<String>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new(max_entries: usize, persistence_path: Option<String>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            max_entries,
            persistence_path,
        }
    }

    /// Load from file if it exists. Entries that have already expired are skipped.
    pub fn load_from_file(path: &str, max_entries: usize) -> Result<Self, CacheError> {
        let cache = Self::new(max_entries, Some(path.to_string()));
        if Path::new(path).exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            let map: HashMap<CacheKey, CacheEntry> = serde_json::from_reader(reader)?;

            let now = Utc::now().timestamp();
            let total = map.len();
            for (key, entry) in map {
                if entry.is_fresh_at(now) && cache.inner.len() < max_entries {
                    cache.inner.insert(key, entry);
                }
            }
            metrics::record_cache_size(cache.inner.len());
            tracing::info!(
                restored = cache.inner.len(),
                discarded = total - cache.inner.len(),
                "Loaded response cache from file"
            );
        }
        Ok(cache)
    }

    /// Save to file, if a persistence path is configured.
    pub fn save_to_file(&self) -> Result<(), CacheError> {
        if let Some(path) = &self.persistence_path {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);

            let map: HashMap<_, _> = self
                .inner
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect();

            serde_json::to_writer(writer, &map)?;
            tracing::info!(entries = map.len(), path = %path, "Saved response cache to file");
        }
        Ok(())
    }

    /// Live entry for `key` at `now`. A dead entry is evicted on the way.
    pub fn lookup_at(&self, key: &CacheKey, now: i64) -> Option<CachedResponse> {
        let entry = self.inner.get(key)?;
        if entry.is_fresh_at(now) {
            return Some(entry.response.clone());
        }
        drop(entry);

        self.inner.remove_if(key, |_, e| !e.is_fresh_at(now));
        metrics::record_cache_size(self.inner.len());
        None
    }

    /// Store `response` at `now` for `ttl_seconds`.
    pub fn store_at(
        &self,
        key: CacheKey,
        response: CachedResponse,
        ttl_seconds: u64,
        now: i64,
    ) -> Result<(), CacheError> {
        if !self.inner.contains_key(&key) && self.inner.len() >= self.max_entries {
            self.purge_expired(now);
            if self.inner.len() >= self.max_entries {
                return Err(CacheError::Full(self.max_entries));
            }
        }

        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            response,
            stored_at: now,
            expires_at: now.saturating_add(ttl),
        };
        self.inner.insert(key, entry);
        metrics::record_cache_size(self.inner.len());
        Ok(())
    }

    /// Drop every entry that is dead at `now`. Returns how many were removed.
    pub fn purge_expired(&self, now: i64) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.is_fresh_at(now));
        let removed = before - self.inner.len();
        if removed > 0 {
            tracing::debug!(removed, "Purged expired cache entries");
            metrics::record_cache_size(self.inner.len());
        }
        removed
    }

    /// Number of entries held, live or not yet purged.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn lookup(&self, key: &CacheKey) -> Option<CachedResponse> {
        self.lookup_at(key, Utc::now().timestamp())
    }

    async fn store(
        &self,
        key: CacheKey,
        response: CachedResponse,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        self.store_at(key, response, ttl_seconds, Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn key(path: &str) -> CacheKey {
        CacheKey::new(&Method::GET, &path.parse().unwrap())
    }

    fn response(body: &str) -> CachedResponse {
        CachedResponse {
            status: 200,
            headers: vec![("content-type".into(), "application/json".into())],
            body: body.into(),
        }
    }

    #[test]
    fn test_cache_operations() {
        let cache = MemoryCache::new(10, None);
        let k = key("/api/trips");

        // Initial check
        assert!(cache.lookup_at(&k, 1_000).is_none());

        cache.store_at(k.clone(), response("[1]"), 60, 1_000).unwrap();
        assert_eq!(cache.lookup_at(&k, 1_059).unwrap().body, "[1]");

        // Last write wins
        cache.store_at(k.clone(), response("[2]"), 60, 1_010).unwrap();
        assert_eq!(cache.lookup_at(&k, 1_020).unwrap().body, "[2]");
    }

    #[test]
    fn test_expired_entry_evicted() {
        let cache = MemoryCache::new(10, None);
        let k = key("/api/trips/1");

        cache.store_at(k.clone(), response("{}"), 60, 1_000).unwrap();
        assert!(cache.lookup_at(&k, 1_060).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_full_cache_purges_then_refuses() {
        let cache = MemoryCache::new(2, None);

        cache.store_at(key("/a"), response("a"), 10, 1_000).unwrap();
        cache.store_at(key("/b"), response("b"), 100, 1_000).unwrap();

        // "/a" is dead by now and makes room.
        cache.store_at(key("/c"), response("c"), 100, 1_050).unwrap();
        assert_eq!(cache.len(), 2);

        assert!(matches!(
            cache.store_at(key("/d"), response("d"), 100, 1_050),
            Err(CacheError::Full(2))
        ));

        // Overwriting an existing key is always allowed.
        cache.store_at(key("/b"), response("b2"), 100, 1_050).unwrap();
        assert_eq!(cache.lookup_at(&key("/b"), 1_051).unwrap().body, "b2");
    }

    #[test]
    fn test_persistence() {
        let path = std::env::temp_dir().join("trip_gateway_cache_persistence.json");
        let path = path.to_string_lossy().to_string();

        let now = Utc::now().timestamp();
        let cache = MemoryCache::new(10, Some(path.clone()));
        cache.store_at(key("/api/trips"), response("[]"), 86_400, now).unwrap();
        cache.store_at(key("/api/trips/1"), response("{}"), 1, now - 10).unwrap();
        cache.save_to_file().unwrap();

        // Load new instance
        let loaded = MemoryCache::load_from_file(&path, 10).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.lookup_at(&key("/api/trips"), now).unwrap().body, "[]");

        // Cleanup
        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_trait_roundtrip() {
        let cache = MemoryCache::new(10, None);
        let k = key("/api/location/history/timestamp/1000000000");

        cache.store(k.clone(), response("{}"), 3_600).await.unwrap();
        assert!(cache.lookup(&k).await.is_some());
    }
}
