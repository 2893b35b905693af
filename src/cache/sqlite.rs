//! SQLite cache implementation

use super::CacheClient;
use crate::{CatalogError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Key/value cache stored in a single SQLite table
///
/// Useful when the service runs as a single instance and the cache should
/// survive restarts without a Redis server.
pub struct SqliteCache {
    conn: Mutex<Connection>,
    path: PathBuf,
    ttl: Option<Duration>,
}

impl SqliteCache {
    /// Open or create a cache database
    pub fn open(path: &Path, ttl: Option<Duration>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Opening cache database");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let cache = Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
            ttl,
        };
        cache.init_schema()?;

        Ok(cache)
    }

    fn init_schema(&self) -> Result<()> {
        self.lock()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                expires_at INTEGER
            );
            "#,
        )?;
        Ok(())
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> Result<usize> {
        let removed = self.lock()?.execute(
            "DELETE FROM cache_entries WHERE expires_at IS NOT NULL AND expires_at <= ?",
            params![now_millis()],
        )?;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired cache entries");
        }
        Ok(removed)
    }

    /// Get the database path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CatalogError::Cache(format!("Lock poisoned: {}", e)))
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn cache_err(e: rusqlite::Error) -> CatalogError {
    CatalogError::Cache(e.to_string())
}

#[async_trait]
impl CacheClient for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>, Option<i64>)> = self
            .lock()?
            .query_row(
                "SELECT value, expires_at FROM cache_entries WHERE key = ?",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(cache_err)?;

        Ok(match row {
            Some((_, Some(expires_at))) if expires_at <= now_millis() => None,
            Some((value, _)) => Some(value),
            None => None,
        })
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let expires_at = self.ttl.map(|ttl| now_millis() + ttl.as_millis() as i64);
        self.lock()?
            .execute(
                "INSERT OR REPLACE INTO cache_entries (key, value, expires_at) VALUES (?, ?, ?)",
                params![key, value, expires_at],
            )
            .map_err(cache_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock()?
            .execute("DELETE FROM cache_entries WHERE key = ?", params![key])
            .map_err(cache_err)?;
        Ok(())
    }
}
