//! Response caching subsystem.
//!
//! # Data Flow
//! ```text
//! Allowed request for a cache-candidate endpoint
//!     → store.rs (CacheKey from method + path + query, lookup)
//!     → hit: serve stored response
//!     → miss: fetch, verify, redact
//!         → policy.rs (endpoint + payload + clock → CacheDecision)
//!         → store.rs (store with TTL when cacheable)
//! ```
//!
//! # Design Decisions
//! - The pipeline depends only on the `ResponseCache` trait
//! - Only full successful responses are stored
//! - Concurrent misses for the same key may both fetch; last write wins
//! - Store failures are logged, never surfaced to the client

pub mod memory;
pub mod policy;
pub mod store;

use std::sync::Arc;

use crate::config::CacheConfig;

pub use memory::MemoryCache;
pub use policy::{decide, CacheDecision, Freshness};
pub use store::{CacheError, CacheKey, CachedResponse, DisabledCache, ResponseCache};

/// Build the cache described by `config`.
///
/// A persistence file that cannot be read is logged and an empty cache used.
pub fn from_config(config: &CacheConfig) -> (Arc<dyn ResponseCache>, Option<MemoryCache>) {
    if !config.enabled {
        tracing::info!("Response cache disabled");
        return (Arc::new(DisabledCache), None);
    }

    let cache = match &config.persistence_path {
        Some(path) => MemoryCache::load_from_file(path, config.max_entries).unwrap_or_else(|e| {
            tracing::error!(error = %e, path = %path, "Failed to load cache file, starting empty");
            MemoryCache::new(config.max_entries, Some(path.clone()))
        }),
        None => MemoryCache::new(config.max_entries, None),
    };

    (Arc::new(cache.clone()), Some(cache))
}
