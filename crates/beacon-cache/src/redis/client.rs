//! Redis connection management.

use redis::Client;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use tracing::info;

use beacon_core::config::RedisConfig;
use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;

/// Redis client wrapper with connection management.
///
/// The shared [`ConnectionManager`] serves regular commands. Blocking
/// stream reads and pub/sub subscriptions get dedicated connections so
/// they never stall the shared pipeline.
#[derive(Clone)]
pub struct RedisClient {
    /// Underlying client, used to open dedicated connections.
    client: Client,
    /// Shared reconnecting connection for regular commands.
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient").finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Create a new Redis client from configuration.
    pub async fn connect(config: &RedisConfig) -> AppResult<Self> {
        let url = config.url();
        info!(url = %mask_redis_url(&url), "Connecting to Redis");

        let client = Client::open(url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to create Redis client", e)
        })?;

        let conn = ConnectionManager::new(client.clone()).await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to connect to Redis", e)
        })?;

        info!("Successfully connected to Redis");
        Ok(Self { client, conn })
    }

    /// Get a mutable clone of the shared connection manager.
    pub fn conn_mut(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Open a dedicated connection, e.g. for blocking stream reads.
    pub async fn dedicated_connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Cache, "Failed to open Redis connection", e)
            })
    }

    /// Open a pub/sub subscription connection.
    pub async fn pubsub(&self) -> AppResult<redis::aio::PubSub> {
        self.client.get_async_pubsub().await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to open Redis pub/sub", e)
        })
    }
}

/// Mask password in a Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos >= scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_redis_url() {
        assert_eq!(
            mask_redis_url("redis://:secret@localhost:6379"),
            "redis://:****@localhost:6379"
        );
        assert_eq!(
            mask_redis_url("redis://localhost:6379"),
            "redis://localhost:6379"
        );
    }
}
