//! Redis cache provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;
use beacon_core::traits::cache::CacheProvider;

use super::client::RedisClient;

/// Redis-backed cache provider.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    /// Redis client.
    client: RedisClient,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .set_ex(key, value, ttl.as_secs())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();

        // SET key value EX ttl NX
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs())
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(result.is_some())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let result: bool = conn.exists(key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let added: i64 = conn.sadd(key, member).await.map_err(Self::map_err)?;
        Ok(added > 0)
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let removed: i64 = conn.srem(key, member).await.map_err(Self::map_err)?;
        Ok(removed > 0)
    }

    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let result: bool = conn.sismember(key, member).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
