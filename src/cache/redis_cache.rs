//! Redis cache client

use super::CacheClient;
use crate::{CatalogError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::timeout;

/// [`CacheClient`] backed by a Redis server
///
/// The connection is established on first use and reconnects on its own
/// afterwards, so a Redis outage at boot does not stop the service from
/// starting. Every call is bounded by `call_timeout`.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    call_timeout: Duration,
    ttl: Option<Duration>,
}

impl RedisCache {
    pub fn new(url: &str, call_timeout: Duration, ttl: Option<Duration>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            call_timeout,
            ttl,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                tracing::debug!("Connecting to Redis");
                ConnectionManager::new(self.client.clone()).await
            })
            .await?;
        Ok(conn.clone())
    }

    async fn bounded<T, Fut>(&self, op: &str, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CatalogError::Cache(format!(
                "redis {} timed out after {}ms",
                op,
                self.call_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl CacheClient for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.bounded("GET", async {
            let mut conn = self.connection().await?;
            let value: Option<Vec<u8>> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.bounded("SET", async {
            let mut conn = self.connection().await?;
            match self.ttl {
                Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await?,
                None => conn.set::<_, _, ()>(key, value).await?,
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.bounded("DEL", async {
            let mut conn = self.connection().await?;
            conn.del::<_, ()>(key).await?;
            Ok(())
        })
        .await
    }
}
