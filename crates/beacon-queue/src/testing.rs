//! In-memory doubles and fixtures for pipeline tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use beacon_cache::memory::MemoryCacheProvider;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::cache::CacheProvider;
use beacon_core::traits::store::{NotificationStore, PreferencesStore};
use beacon_entity::notification::{
    NewNotification, Notification, NotificationEvent, NotificationStatistics,
};
use beacon_entity::preferences::{PreferencesPatch, QuietHours, UserPreferences};
use beacon_realtime::frame::Outbound;
use beacon_realtime::{ConnectionHandle, PresenceTracker, SocketRegistry};

use crate::grouping::GroupingEngine;
use crate::worker::WorkerContext;

/// In-memory notification store mirroring the relational contract.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    items: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            kind: new.kind,
            actor_id: new.actor_id,
            actor_name: new.actor_name,
            actor_picture: new.actor_picture,
            related_id: new.related_id,
            message: new.message,
            read: false,
            priority: new.priority,
            metadata: new.metadata,
            expires_at: Some(new.expires_at.unwrap_or(now + Duration::days(90))),
            created_at: now,
            updated_at: now,
        };
        self.items.lock().await.push(notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        let now = Utc::now();
        Ok(self
            .items
            .lock()
            .await
            .iter()
            .find(|n| n.id == id && !n.is_expired(now))
            .cloned())
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> AppResult<(Vec<Notification>, i64)> {
        let now = Utc::now();
        let items = self.items.lock().await;
        let mut matching: Vec<Notification> = items
            .iter()
            .filter(|n| {
                n.user_id == user_id && !n.is_expired(now) && (!unread_only || !n.read)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, notification: &Notification) -> AppResult<Notification> {
        let mut items = self.items.lock().await;
        let existing = items
            .iter_mut()
            .find(|n| n.id == notification.id)
            .ok_or_else(|| AppError::not_found("Notification not found"))?;
        existing.message = notification.message.clone();
        existing.metadata = notification.metadata.clone();
        existing.read = notification.read;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn mark_read(&self, user_id: &str, id: Uuid) -> AppResult<Notification> {
        let mut items = self.items.lock().await;
        let existing = items
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or_else(|| AppError::not_found("Notification not found"))?;
        existing.read = true;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        let mut items = self.items.lock().await;
        let mut marked = 0;
        for n in items.iter_mut().filter(|n| n.user_id == user_id && !n.read) {
            n.read = true;
            n.updated_at = Utc::now();
            marked += 1;
        }
        Ok(marked)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        let mut items = self.items.lock().await;
        let position = items
            .iter()
            .position(|n| n.id == id && n.user_id == user_id)
            .ok_or_else(|| AppError::not_found("Notification not found"))?;
        items.remove(position);
        Ok(())
    }

    async fn delete_all(&self, user_id: &str) -> AppResult<u64> {
        let mut items = self.items.lock().await;
        let before = items.len();
        items.retain(|n| n.user_id != user_id);
        Ok((before - items.len()) as u64)
    }

    async fn count_unread(&self, user_id: &str) -> AppResult<i64> {
        let now = Utc::now();
        Ok(self
            .items
            .lock()
            .await
            .iter()
            .filter(|n| n.user_id == user_id && !n.read && !n.is_expired(now))
            .count() as i64)
    }

    async fn statistics(&self, user_id: &str) -> AppResult<Vec<NotificationStatistics>> {
        let now = Utc::now();
        let items = self.items.lock().await;
        let mut by_kind: HashMap<String, (i64, i64)> = HashMap::new();
        for n in items
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_expired(now))
        {
            let entry = by_kind.entry(n.kind.clone()).or_default();
            entry.0 += 1;
            if !n.read {
                entry.1 += 1;
            }
        }
        Ok(by_kind
            .into_iter()
            .map(|(kind, (count, unread))| NotificationStatistics {
                kind,
                count,
                unread,
            })
            .collect())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut items = self.items.lock().await;
        let before = items.len();
        items.retain(|n| !n.is_expired(now));
        Ok((before - items.len()) as u64)
    }
}

/// In-memory preferences store with lazy defaults.
#[derive(Debug, Default)]
pub struct MemoryPreferencesStore {
    prefs: Mutex<HashMap<String, UserPreferences>>,
}

fn default_preferences(user_id: &str) -> UserPreferences {
    UserPreferences {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        notifications: Json(UserPreferences::default_toggles()),
        email_notifications: true,
        push_notifications: true,
        quiet_hours: Json(QuietHours::default()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl PreferencesStore for MemoryPreferencesStore {
    async fn get_or_create(&self, user_id: &str) -> AppResult<UserPreferences> {
        let mut map = self.prefs.lock().await;
        Ok(map
            .entry(user_id.to_string())
            .or_insert_with(|| default_preferences(user_id))
            .clone())
    }

    async fn update(&self, user_id: &str, patch: PreferencesPatch) -> AppResult<UserPreferences> {
        let mut map = self.prefs.lock().await;
        let prefs = map
            .entry(user_id.to_string())
            .or_insert_with(|| default_preferences(user_id));
        prefs.apply(patch);
        prefs.updated_at = Utc::now();
        Ok(prefs.clone())
    }
}

/// A fully wired pipeline over in-memory backends.
pub struct TestPipeline {
    pub ctx: Arc<WorkerContext>,
    pub store: Arc<MemoryNotificationStore>,
    pub preferences: Arc<MemoryPreferencesStore>,
    pub registry: Arc<SocketRegistry>,
    pub cache: Arc<dyn CacheProvider>,
}

/// Build a pipeline with the given grouping window.
pub fn pipeline(window_secs: u64) -> TestPipeline {
    let cache: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::new());
    let store = Arc::new(MemoryNotificationStore::default());
    let preferences = Arc::new(MemoryPreferencesStore::default());
    let registry = Arc::new(SocketRegistry::new(PresenceTracker::new(cache.clone())));

    let grouping = GroupingEngine::new(
        cache.clone(),
        store.clone() as Arc<dyn NotificationStore>,
        registry.clone(),
        window_secs,
    );

    let ctx = Arc::new(WorkerContext {
        store: store.clone() as Arc<dyn NotificationStore>,
        preferences: preferences.clone() as Arc<dyn PreferencesStore>,
        registry: registry.clone(),
        grouping,
    });

    TestPipeline {
        ctx,
        store,
        preferences,
        registry,
        cache,
    }
}

/// Attach a fake socket connection and return its frame receiver.
pub async fn attach_connection(
    registry: &SocketRegistry,
    user_id: &str,
) -> mpsc::Receiver<Outbound> {
    let (tx, rx) = mpsc::channel(32);
    registry
        .register(Arc::new(ConnectionHandle::new(user_id, tx)))
        .await;
    rx
}

/// A normalized event, as the listener would hand it to the queue.
pub fn event(kind: &str, user_id: &str, actor_id: &str, actor_name: &str) -> NotificationEvent {
    let mut event = NotificationEvent {
        user_id: user_id.to_string(),
        kind: kind.to_string(),
        actor_id: actor_id.to_string(),
        actor_name: actor_name.to_string(),
        ..Default::default()
    };
    if let Some(parsed) = beacon_entity::notification::NotificationKind::parse(kind) {
        event.message = parsed.default_message(actor_name);
    }
    event
}

/// Pull the next frame off a fake connection and decode it.
pub async fn next_frame(rx: &mut mpsc::Receiver<Outbound>) -> serde_json::Value {
    loop {
        match rx.recv().await.expect("expected a frame") {
            Outbound::Frame(text) => {
                return serde_json::from_str(&text).expect("frame is valid JSON");
            }
            Outbound::Ping => continue,
        }
    }
}
