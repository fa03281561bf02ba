//! Redis connection and cache provider configuration.

/// Redis connection configuration.
///
/// Redis backs three concerns: the shared cache, the pub/sub event bus,
/// and the durable notification stream.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis host.
    pub host: String,
    /// Redis port.
    pub port: u16,
    /// Redis password (may be empty).
    pub password: String,
}

impl RedisConfig {
    /// Assemble the connection URL.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}", self.host, self.port)
        } else {
            format!("redis://:{}@{}:{}", self.password, self.host, self.port)
        }
    }
}

/// Cache provider selection.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Provider type: `"redis"` or `"memory"`.
    ///
    /// The in-memory provider only covers the key/value and set
    /// operations; the event bus and stream always require Redis.
    pub provider: String,
}

pub(crate) fn default_redis_host() -> String {
    "localhost".to_string()
}

pub(crate) fn default_redis_port() -> u16 {
    6379
}

pub(crate) fn default_provider() -> String {
    "redis".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_with_and_without_password() {
        let mut config = RedisConfig {
            host: "cache.local".to_string(),
            port: 6379,
            password: String::new(),
        };
        assert_eq!(config.url(), "redis://cache.local:6379");

        config.password = "s3cret".to_string();
        assert_eq!(config.url(), "redis://:s3cret@cache.local:6379");
    }
}
