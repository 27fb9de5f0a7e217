//! Redis cache implementation.
//!
//! `CacheStore` is the seam the query cache and the health check talk to;
//! `Cache` implements it over a shared `ConnectionManager`.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};

use crate::errors::AppResult;

/// Key/value and set operations the query cache needs.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Raw string stored at `key`
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` at `key`, expiring after `ttl_seconds`
    async fn set_with_ttl(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()>;

    /// Delete a set of keys. Empty input is a no-op.
    async fn delete_many(&self, keys: Vec<String>) -> AppResult<()>;

    /// Add `member` to the set at `key`
    async fn add_to_set(&self, key: &str, member: &str) -> AppResult<()>;

    /// Members of the set at `key`
    async fn set_members(&self, key: &str) -> AppResult<Vec<String>>;

    /// Remaining lifetime of `key` in seconds. `None` when the key is missing
    /// or never expires.
    async fn ttl(&self, key: &str) -> AppResult<Option<u64>>;

    /// Set the lifetime of `key`
    async fn expire(&self, key: &str, ttl_seconds: u64) -> AppResult<()>;

    /// Round-trip a PING to check connectivity
    async fn ping(&self) -> AppResult<()>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis at `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn delete_many(&self, keys: Vec<String>) -> AppResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(keys).await?;
        Ok(())
    }

    async fn add_to_set(&self, key: &str, member: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        let mut conn = self.connection.clone();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<u64>> {
        let mut conn = self.connection.clone();
        // -2: no such key, -1: no expiry
        let remaining: i64 = conn.ttl(key).await?;
        Ok(u64::try_from(remaining).ok())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        conn.expire::<_, ()>(key, ttl).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
