//! Application configuration schemas.
//!
//! Configuration is read from environment variables through the `config`
//! crate and grouped into sectioned structs. Every variable has a default
//! so the service boots on a developer machine with nothing set.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod notification;

use serde::Deserialize;

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::cache::{CacheConfig, RedisConfig};
pub use self::database::DatabaseConfig;
pub use self::notification::NotificationConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// PostgreSQL connection settings.
    pub database: DatabaseConfig,
    /// Redis connection settings.
    pub redis: RedisConfig,
    /// Cache provider selection.
    pub cache: CacheConfig,
    /// Authentication settings.
    pub auth: AuthConfig,
    /// CORS settings.
    pub cors: CorsConfig,
    /// Notification pipeline settings.
    pub notifications: NotificationConfig,
}

/// Flat environment view, one field per variable.
///
/// `config::Environment` lowercases variable names, so `SERVER_PORT`
/// lands on `server_port` and so on.
#[derive(Debug, Deserialize)]
struct RawEnv {
    #[serde(default = "app::default_port")]
    server_port: u16,
    #[serde(default = "app::default_mode")]
    server_mode: String,

    #[serde(default = "database::default_host")]
    db_host: String,
    #[serde(default = "database::default_port")]
    db_port: u16,
    #[serde(default = "database::default_user")]
    db_user: String,
    #[serde(default)]
    db_password: String,
    #[serde(default = "database::default_name")]
    db_name: String,

    #[serde(default = "cache::default_redis_host")]
    redis_host: String,
    #[serde(default = "cache::default_redis_port")]
    redis_port: u16,
    #[serde(default)]
    redis_password: String,
    #[serde(default = "cache::default_provider")]
    cache_provider: String,

    #[serde(default = "auth::default_jwt_secret")]
    jwt_secret: String,

    #[serde(default = "app::default_cors_origins")]
    cors_allowed_origins: String,

    #[serde(default = "notification::default_queue_workers")]
    notification_queue_workers: usize,
    #[serde(default = "notification::default_grouping_window_secs")]
    notification_grouping_window_secs: u64,
    #[serde(default = "notification::default_expiry_days")]
    notification_default_expiry_days: i64,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, AppError> {
        let raw: RawEnv = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
            .map_err(|e| {
                AppError::configuration(format!("Failed to deserialize configuration: {e}"))
            })?;

        Ok(Self {
            server: ServerConfig {
                port: raw.server_port,
                mode: raw.server_mode,
            },
            database: DatabaseConfig {
                host: raw.db_host,
                port: raw.db_port,
                user: raw.db_user,
                password: raw.db_password,
                name: raw.db_name,
            },
            redis: RedisConfig {
                host: raw.redis_host,
                port: raw.redis_port,
                password: raw.redis_password,
            },
            cache: CacheConfig {
                provider: raw.cache_provider,
            },
            auth: AuthConfig {
                jwt_secret: raw.jwt_secret,
            },
            cors: CorsConfig {
                allowed_origins: raw.cors_allowed_origins,
            },
            notifications: NotificationConfig {
                queue_workers: raw.notification_queue_workers,
                grouping_window_secs: raw.notification_grouping_window_secs,
                default_expiry_days: raw.notification_default_expiry_days,
            },
        })
    }
}
