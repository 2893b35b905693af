//! Cache clients
//!
//! Opaque key/value byte storage behind [`CacheClient`]. The coordinator
//! treats every backend as an optimization: a failed call degrades to a
//! miss on read and a skipped invalidation on write.
//!
//! Backends:
//! - [`MemoryCache`]: process-local map, optional TTL
//! - [`SqliteCache`]: single-table SQLite cache, optional TTL
//! - [`RedisCache`]: shared Redis server with per-call timeouts

mod memory;
mod redis_cache;
mod sqlite;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use sqlite::SqliteCache;

use crate::config::{CacheBackendKind, CacheSettings};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Key/value store for serialized values
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Fetch the bytes under `key`, if present
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Build the cache client selected by configuration
pub fn from_settings(settings: &CacheSettings) -> Result<Arc<dyn CacheClient>> {
    let ttl = settings.ttl_secs.map(Duration::from_secs);

    let client: Arc<dyn CacheClient> = match settings.backend {
        CacheBackendKind::Memory => Arc::new(MemoryCache::new(ttl)),
        CacheBackendKind::Sqlite => {
            let cache = SqliteCache::open(&settings.path, ttl)?;
            // Rows left behind by a previous run
            cache.purge_expired()?;
            Arc::new(cache)
        }
        CacheBackendKind::Redis => Arc::new(RedisCache::new(
            &settings.redis_url,
            Duration::from_millis(settings.timeout_ms),
            ttl,
        )?),
    };

    tracing::info!(backend = ?settings.backend, ttl_secs = ?settings.ttl_secs, "Cache client ready");
    Ok(client)
}
