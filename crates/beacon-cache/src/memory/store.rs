//! In-memory cache implementation using the moka crate.
//!
//! Covers the key/value and set operations of [`CacheProvider`] for
//! tests and single-node development. The event bus and the durable
//! stream have no in-memory counterpart.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use moka::Expiry;
use moka::future::Cache;

use beacon_core::result::AppResult;
use beacon_core::traits::cache::CacheProvider;

/// Upper bound on tracked entries.
const MAX_CAPACITY: u64 = 100_000;

/// A cached value paired with its per-entry TTL.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expiry policy that honors each entry's own TTL.
struct PerEntryExpiry;

impl Expiry<String, Entry> for PerEntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// Key/value entries with per-entry TTL.
    entries: Cache<String, Entry>,
    /// Named sets. Set members do not expire.
    sets: Arc<DashMap<String, DashSet<String>>>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache.
    pub fn new() -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_CAPACITY)
            .expire_after(PerEntryExpiry)
            .build();

        Self {
            entries,
            sets: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MemoryCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.entries
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        // Check-then-insert; single-node in-memory use tolerates the gap.
        if self.entries.contains_key(key) {
            return Ok(false);
        }
        self.set(key, value, ttl).await?;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        let set = self.sets.entry(key.to_string()).or_default();
        Ok(set.insert(member.to_string()))
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        match self.sets.get(key) {
            Some(set) => Ok(set.remove(member).is_some()),
            None => Ok(false),
        }
    }

    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool> {
        Ok(self
            .sets
            .get(key)
            .map(|set| set.contains(member))
            .unwrap_or(false))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get() {
        let provider = MemoryCacheProvider::new();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            provider.get("key1").await.unwrap(),
            Some("value1".to_string())
        );
        assert_eq!(provider.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = MemoryCacheProvider::new();
        provider
            .set("key2", "value2", Duration::from_secs(60))
            .await
            .unwrap();
        provider.delete("key2").await.unwrap();
        assert_eq!(provider.get("key2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_nx() {
        let provider = MemoryCacheProvider::new();
        assert!(
            provider
                .set_nx("nx_key", "first", Duration::from_secs(60))
                .await
                .unwrap()
        );
        assert!(
            !provider
                .set_nx("nx_key", "second", Duration::from_secs(60))
                .await
                .unwrap()
        );
        assert_eq!(
            provider.get("nx_key").await.unwrap(),
            Some("first".to_string())
        );
    }

    #[tokio::test]
    async fn test_sets() {
        let provider = MemoryCacheProvider::new();
        assert!(provider.set_add("online", "u1").await.unwrap());
        assert!(!provider.set_add("online", "u1").await.unwrap());
        assert!(provider.set_contains("online", "u1").await.unwrap());
        assert!(!provider.set_contains("online", "u2").await.unwrap());
        assert!(provider.set_remove("online", "u1").await.unwrap());
        assert!(!provider.set_remove("online", "u1").await.unwrap());
        assert!(!provider.set_contains("online", "u1").await.unwrap());
    }
}
