//! Response cache interface.
//!
//! The request pipeline only sees [`ResponseCache`]: lookup by key, and
//! store with a time to live. Any key-value store can sit behind it.

use async_trait::async_trait;
use axum::http::{Method, Uri};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical request identity: method plus path and query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: &Method, uri: &Uri) -> Self {
        let target = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        Self(format!("{} {}", method, target))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A final response as it left the gateway. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Errors from a cache backend. These never fail a request.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache is full ({0} entries)")]
    Full(usize),

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Narrow key-value interface over any response store.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// A live entry for `key`, if any. Expired entries are never returned.
    async fn lookup(&self, key: &CacheKey) -> Option<CachedResponse>;

    /// Store `response` under `key` for `ttl_seconds`. Last write wins.
    async fn store(
        &self,
        key: CacheKey,
        response: CachedResponse,
        ttl_seconds: u64,
    ) -> Result<(), CacheError>;
}

/// A cache that holds nothing. Used when caching is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl ResponseCache for DisabledCache {
    async fn lookup(&self, _key: &CacheKey) -> Option<CachedResponse> {
        None
    }

    async fn store(
        &self,
        _key: CacheKey,
        _response: CachedResponse,
        _ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        Ok(())
    }
}
