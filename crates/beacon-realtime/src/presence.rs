//! Shared presence view backed by the cache.
//!
//! Presence outlives a single process: the online set and per-user
//! markers live in the shared cache so any instance can answer
//! "is this user connected somewhere".

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use beacon_cache::keys::{online_users, socket_marker};
use beacon_core::traits::cache::CacheProvider;

/// TTL on the per-user presence marker.
const MARKER_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Value stored under the presence marker.
const MARKER_VALUE: &str = "connected";

/// Tracks which users are connected, mirrored into the shared cache.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    cache: Arc<dyn CacheProvider>,
}

impl PresenceTracker {
    /// Create a new presence tracker.
    pub fn new(cache: Arc<dyn CacheProvider>) -> Self {
        Self { cache }
    }

    /// Mark a user as online.
    ///
    /// Cache failures are logged, not propagated; presence is advisory
    /// and must not break connection registration.
    pub async fn set_online(&self, user_id: &str) {
        if let Err(e) = self.cache.set_add(&online_users(), user_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to add user to online set");
        }
        if let Err(e) = self
            .cache
            .set(&socket_marker(user_id), MARKER_VALUE, MARKER_TTL)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to write presence marker");
        }
    }

    /// Mark a user as offline.
    pub async fn set_offline(&self, user_id: &str) {
        if let Err(e) = self.cache.set_remove(&online_users(), user_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to remove user from online set");
        }
        if let Err(e) = self.cache.delete(&socket_marker(user_id)).await {
            warn!(user_id = %user_id, error = %e, "Failed to clear presence marker");
        }
    }

    /// Whether a user is connected to any instance.
    pub async fn is_online(&self, user_id: &str) -> bool {
        match self.cache.set_contains(&online_users(), user_id).await {
            Ok(online) => online,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Presence lookup failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_cache::memory::MemoryCacheProvider;

    #[tokio::test]
    async fn test_online_offline_round_trip() {
        let cache: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::new());
        let presence = PresenceTracker::new(cache.clone());

        assert!(!presence.is_online("u1").await);

        presence.set_online("u1").await;
        assert!(presence.is_online("u1").await);
        assert!(cache.exists(&socket_marker("u1")).await.unwrap());

        presence.set_offline("u1").await;
        assert!(!presence.is_online("u1").await);
        assert!(!cache.exists(&socket_marker("u1")).await.unwrap());
    }
}
