//! Store contracts for notifications and user preferences.
//!
//! The pipeline and the HTTP surface are wired against these traits;
//! `beacon-database` provides the PostgreSQL implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use beacon_entity::notification::{NewNotification, Notification, NotificationStatistics};
use beacon_entity::preferences::{PreferencesPatch, UserPreferences};

use crate::result::AppResult;

/// Persistent store for notifications.
///
/// Expired entities (`expires_at <= now`) are invisible to every read
/// operation; a periodic sweep physically removes them.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new notification, assigning `id` and timestamps.
    ///
    /// When `expires_at` is unset the store applies the configured
    /// default expiry relative to creation time.
    async fn create(&self, new: NewNotification) -> AppResult<Notification>;

    /// Fetch a notification by id, `None` when missing or expired.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// List a user's notifications ordered by `created_at` descending,
    /// plus the total count under the same filter.
    async fn find_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> AppResult<(Vec<Notification>, i64)>;

    /// Rewrite `message`, `metadata`, and `read`, bumping `updated_at`.
    /// Fails with `NotFound` when the notification no longer exists.
    async fn update(&self, notification: &Notification) -> AppResult<Notification>;

    /// Mark one notification as read. Fails with `NotFound` when
    /// `(user_id, id)` does not match an owned notification.
    async fn mark_read(&self, user_id: &str, id: Uuid) -> AppResult<Notification>;

    /// Mark every unread notification of a user as read.
    async fn mark_all_read(&self, user_id: &str) -> AppResult<u64>;

    /// Delete one owned notification; `NotFound` when not owned.
    async fn delete(&self, user_id: &str, id: Uuid) -> AppResult<()>;

    /// Delete every notification of a user.
    async fn delete_all(&self, user_id: &str) -> AppResult<u64>;

    /// Count unread notifications of a user.
    async fn count_unread(&self, user_id: &str) -> AppResult<i64>;

    /// Per-type `{count, unread}` aggregates for a user.
    async fn statistics(&self, user_id: &str) -> AppResult<Vec<NotificationStatistics>>;

    /// Physically delete entities whose expiry has passed.
    /// Returns the number of rows removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Persistent store for per-user notification preferences.
#[async_trait]
pub trait PreferencesStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch a user's preferences, lazily creating defaults on first
    /// access. Never fails with `NotFound`.
    async fn get_or_create(&self, user_id: &str) -> AppResult<UserPreferences>;

    /// Merge a partial update into the stored preferences and return
    /// the merged entity.
    async fn update(&self, user_id: &str, patch: PreferencesPatch) -> AppResult<UserPreferences>;

    /// Whether the user receives notifications of the given kind.
    /// Absent preferences or an absent toggle count as enabled.
    async fn is_enabled(&self, user_id: &str, kind: &str) -> AppResult<bool> {
        Ok(self.get_or_create(user_id).await?.is_enabled(kind))
    }

    /// Whether the user is currently inside their quiet hours window.
    async fn is_in_quiet_hours(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.get_or_create(user_id).await?.is_in_quiet_hours())
    }
}
