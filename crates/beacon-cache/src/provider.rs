//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use beacon_core::config::CacheConfig;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::cache::CacheProvider;

use crate::memory::MemoryCacheProvider;
use crate::redis::RedisCacheProvider;
use crate::redis::client::RedisClient;

/// Cache manager that wraps the configured cache provider.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a cache manager from configuration and the shared Redis client.
    pub fn new(config: &CacheConfig, redis: &RedisClient) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            "redis" => {
                info!("Initializing Redis cache provider");
                Arc::new(RedisCacheProvider::new(redis.clone()))
            }
            "memory" => {
                info!("Initializing in-memory cache provider");
                Arc::new(MemoryCacheProvider::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: redis, memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.set_nx(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_add(key, member).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_remove(key, member).await
    }

    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_contains(key, member).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
