//! Dedup and grouping engine for burst-prone notification kinds.
//!
//! Only `like` and `profile-view` events participate. State lives in
//! two places: the dedup key in the shared cache (TTL = grouping
//! window) pointing at the current notification id, and `groupCount`
//! on the notification itself.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use beacon_cache::keys;
use beacon_core::error::ErrorKind;
use beacon_core::result::AppResult;
use beacon_core::traits::cache::CacheProvider;
use beacon_core::traits::store::NotificationStore;
use beacon_entity::notification::{NotificationEvent, NotificationKind};
use beacon_realtime::SocketRegistry;
use beacon_realtime::frame::EVENT_UPDATED;

/// Sliding-window dedup and in-place grouping of repeat events.
#[derive(Debug, Clone)]
pub struct GroupingEngine {
    cache: Arc<dyn CacheProvider>,
    store: Arc<dyn NotificationStore>,
    registry: Arc<SocketRegistry>,
    /// Dedup key TTL; bounds how long a burst keeps coalescing.
    window: Duration,
}

impl GroupingEngine {
    /// Create a new grouping engine.
    pub fn new(
        cache: Arc<dyn CacheProvider>,
        store: Arc<dyn NotificationStore>,
        registry: Arc<SocketRegistry>,
        window_secs: u64,
    ) -> Self {
        Self {
            cache,
            store,
            registry,
            window: Duration::from_secs(window_secs),
        }
    }

    fn key(kind: NotificationKind, event: &NotificationEvent) -> String {
        keys::dedup(
            kind.as_str(),
            &event.user_id,
            &event.actor_id,
            Some(&event.related_id),
        )
    }

    /// Find the notification id currently holding this event's bucket.
    pub async fn lookup(&self, kind: NotificationKind, event: &NotificationEvent) -> Option<String> {
        match self.cache.get(&Self::key(kind, event)).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!(error = %e, "Dedup lookup failed, treating as miss");
                None
            }
        }
    }

    /// Record a freshly created notification as this bucket's target.
    ///
    /// Set-if-absent: when two workers race to create, the loser's id
    /// is discarded and its notification stays orphaned (never grouped).
    /// The TTL is never refreshed afterwards, so the grouping window is
    /// anchored on the original creation.
    pub async fn remember(
        &self,
        kind: NotificationKind,
        event: &NotificationEvent,
        notification_id: &str,
    ) {
        let key = Self::key(kind, event);
        match self.cache.set_nx(&key, notification_id, self.window).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(key = %key, "Dedup key already held, duplicate stays orphaned")
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to write dedup key"),
        }
    }

    /// Fold a repeat event into the existing notification.
    ///
    /// Returns `false` when the target raced out (expired or deleted);
    /// the caller then falls through to the normal create path.
    pub async fn apply(
        &self,
        existing_id: &str,
        kind: NotificationKind,
        event: &NotificationEvent,
    ) -> AppResult<bool> {
        let Ok(id) = Uuid::parse_str(existing_id) else {
            warn!(existing_id = %existing_id, "Dedup key held a malformed id");
            return Ok(false);
        };

        let Some(mut notification) = self.store.find_by_id(id).await? else {
            debug!(id = %id, "Grouping target gone, falling back to create");
            return Ok(false);
        };

        let count = notification.group_count();
        notification.set_group_count(count + 1);
        // Anchored on the stored notification's actor, the first of the burst.
        notification.message = grouped_message(kind, &notification.actor_name, count);

        let updated = match self.store.update(&notification).await {
            Ok(updated) => updated,
            Err(e) if e.kind == ErrorKind::NotFound => {
                debug!(id = %id, "Grouping target deleted mid-update, falling back to create");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        self.registry
            .send_to_user(&event.user_id, EVENT_UPDATED, &updated)
            .await;

        info!(
            id = %updated.id,
            group_count = count + 1,
            "Grouped notification updated"
        );
        Ok(true)
    }
}

/// Rewritten message for a grouped notification.
///
/// `previous_count` is the group count before this event was folded in.
pub fn grouped_message(kind: NotificationKind, actor_name: &str, previous_count: i64) -> String {
    let verb = kind.action_verb();
    let noun = kind.target_noun();
    if previous_count == 1 {
        format!("{actor_name} and 1 other {verb} your {noun}")
    } else {
        format!("{actor_name} and {previous_count} others {verb} your {noun}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_message_second_event() {
        assert_eq!(
            grouped_message(NotificationKind::Like, "Bob", 1),
            "Bob and 1 other liked your post"
        );
    }

    #[test]
    fn test_grouped_message_later_events() {
        assert_eq!(
            grouped_message(NotificationKind::Like, "Carol", 2),
            "Carol and 2 others liked your post"
        );
        assert_eq!(
            grouped_message(NotificationKind::ProfileView, "Dave", 5),
            "Dave and 5 others viewed your profile"
        );
    }
}
