//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for shared-cache backends (Redis or in-memory).
///
/// Values are plain strings; callers serialize as needed. Sets back the
/// cross-instance presence view, set-if-absent backs dedup key writes.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value only if the key does not already exist (NX).
    /// Returns `true` if the value was set, `false` if the key already existed.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Add a member to a set. Returns `true` if the member was newly added.
    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Remove a member from a set. Returns `true` if the member was present.
    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Check whether a member belongs to a set.
    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
