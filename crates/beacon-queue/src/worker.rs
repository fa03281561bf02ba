//! Stream consumer workers and per-message processing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use beacon_cache::EventStream;
use beacon_core::result::AppResult;
use beacon_core::traits::store::{NotificationStore, PreferencesStore};
use beacon_entity::notification::{
    GROUP_COUNT_KEY, NewNotification, NotificationEvent, NotificationKind, Priority,
};
use beacon_realtime::SocketRegistry;
use beacon_realtime::frame::EVENT_NEW;

use crate::grouping::GroupingEngine;

/// Pause after a failed stream read, so a down Redis does not hot-loop.
const READ_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Dependencies shared by all queue workers.
#[derive(Debug)]
pub struct WorkerContext {
    /// Persistent notification store.
    pub store: Arc<dyn NotificationStore>,
    /// Preference store for the delivery gate.
    pub preferences: Arc<dyn PreferencesStore>,
    /// Socket registry for live pushes.
    pub registry: Arc<SocketRegistry>,
    /// Dedup and grouping engine.
    pub grouping: GroupingEngine,
}

/// One named consumer in the worker pool.
#[derive(Debug)]
pub struct QueueWorker {
    name: String,
    stream: Arc<EventStream>,
    ctx: Arc<WorkerContext>,
}

impl QueueWorker {
    /// Create a new worker.
    pub fn new(name: String, stream: Arc<EventStream>, ctx: Arc<WorkerContext>) -> Self {
        Self { name, stream, ctx }
    }

    /// Run the consume loop until the cancel signal fires.
    ///
    /// Every read entry is acked exactly once, whether processing
    /// succeeded or not: the store write is the system of record, and
    /// re-delivery would duplicate notifications since the dedup window
    /// is short. Failures are logged and the message is not replayed.
    pub async fn run(self, mut cancel: watch::Receiver<bool>) {
        let mut consumer = match self.stream.consumer(&self.name).await {
            Ok(consumer) => consumer,
            Err(e) => {
                error!(consumer = %self.name, error = %e, "Failed to open stream consumer");
                return;
            }
        };

        info!(consumer = %self.name, "Queue worker started");

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!(consumer = %self.name, "Queue worker shutting down");
                        return;
                    }
                }
                result = consumer.read() => match result {
                    Ok(entries) => {
                        for entry in entries {
                            if let Err(e) = process_event(&self.ctx, &entry.data).await {
                                error!(
                                    consumer = %self.name,
                                    entry_id = %entry.id,
                                    error = %e,
                                    "Failed to process stream entry"
                                );
                            }
                            if let Err(e) = self.stream.ack(&entry.id).await {
                                error!(
                                    consumer = %self.name,
                                    entry_id = %entry.id,
                                    error = %e,
                                    "Failed to ack stream entry"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        error!(consumer = %self.name, error = %e, "Stream read failed");
                        sleep(READ_ERROR_BACKOFF).await;
                    }
                }
            }
        }
    }
}

/// Process one stream entry payload.
///
/// Validation failures drop the event with a warning and succeed, so
/// the caller acks them away; only store/cache failures surface as
/// errors (and are still acked — see [`QueueWorker::run`]).
pub(crate) async fn process_event(ctx: &WorkerContext, data: &str) -> AppResult<()> {
    let event: NotificationEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Dropping malformed stream entry");
            return Ok(());
        }
    };

    let Some(kind) = NotificationKind::parse(&event.kind) else {
        warn!(kind = %event.kind, "Dropping event of unknown kind");
        return Ok(());
    };

    if !event.has_required_fields() {
        warn!(kind = %kind, "Dropping event with missing required fields");
        return Ok(());
    }

    // Recipients who disabled the kind are dropped before any store write.
    match ctx.preferences.is_enabled(&event.user_id, kind.as_str()).await {
        Ok(false) => {
            debug!(
                user_id = %event.user_id,
                kind = %kind,
                "Notification kind disabled by recipient, dropping"
            );
            return Ok(());
        }
        Ok(true) => {}
        Err(e) => {
            warn!(error = %e, "Preference lookup failed, delivering anyway");
        }
    }

    if kind.groupable() {
        if let Some(existing_id) = ctx.grouping.lookup(kind, &event).await {
            if ctx.grouping.apply(&existing_id, kind, &event).await? {
                return Ok(());
            }
            // Target raced out by expiry or delete; fall through to create.
        }
    }

    let mut metadata = event
        .metadata
        .clone()
        .filter(serde_json::Value::is_object)
        .unwrap_or_else(|| serde_json::json!({}));
    if let Some(map) = metadata.as_object_mut() {
        map.insert(GROUP_COUNT_KEY.to_string(), serde_json::json!(1));
    }

    let created = ctx
        .store
        .create(NewNotification {
            user_id: event.user_id.clone(),
            kind: kind.as_str().to_string(),
            actor_id: event.actor_id.clone(),
            actor_name: event.actor_name.clone(),
            actor_picture: event.actor_picture.clone(),
            related_id: event.related_id_opt(),
            message: event.message.clone(),
            priority: Priority::from_event(&event.priority).as_str().to_string(),
            metadata,
            expires_at: None,
        })
        .await?;

    if kind.groupable() {
        ctx.grouping
            .remember(kind, &event, &created.id.to_string())
            .await;
    }

    // Entity frame strictly before the count frame, so clients can
    // resolve the new id against the counter update.
    ctx.registry
        .send_to_user(&event.user_id, EVENT_NEW, &created)
        .await;

    match ctx.store.count_unread(&event.user_id).await {
        Ok(count) => ctx.registry.send_unread_count(&event.user_id, count).await,
        Err(e) => warn!(user_id = %event.user_id, error = %e, "Failed to refresh unread count"),
    }

    info!(id = %created.id, kind = %kind, user_id = %event.user_id, "Notification processed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::testing::{attach_connection, event, next_frame, pipeline};
    use beacon_core::traits::cache::CacheProvider;
    use beacon_entity::preferences::PreferencesPatch;

    async fn process(ctx: &WorkerContext, event: &NotificationEvent) {
        let data = serde_json::to_string(event).unwrap();
        process_event(ctx, &data).await.unwrap();
    }

    #[tokio::test]
    async fn test_message_event_creates_and_pushes_in_order() {
        let p = pipeline(300);
        let mut rx = attach_connection(&p.registry, "u1").await;

        process(&p.ctx, &event("message", "u1", "a1", "Alice")).await;

        let (stored, total) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(stored[0].kind, "message");
        assert_eq!(stored[0].message, "Alice sent you a message");
        assert_eq!(stored[0].priority, "MEDIUM");
        assert_eq!(stored[0].group_count(), 1);
        assert!(!stored[0].read);

        // Entity frame strictly before the count frame.
        let first = next_frame(&mut rx).await;
        assert_eq!(first["event"], "notification:new");
        assert_eq!(first["payload"]["message"], "Alice sent you a message");

        let second = next_frame(&mut rx).await;
        assert_eq!(second["event"], "notification:unread-count");
        assert_eq!(second["payload"]["count"], 1);
    }

    #[tokio::test]
    async fn test_priority_mapping_from_event() {
        let p = pipeline(300);

        let mut high = event("message", "u1", "a1", "Alice");
        high.priority = "high".to_string();
        process(&p.ctx, &high).await;

        let mut low = event("message", "u1", "a2", "Bob");
        low.priority = "low".to_string();
        process(&p.ctx, &low).await;

        let (stored, _) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        let priorities: Vec<&str> = stored.iter().map(|n| n.priority.as_str()).collect();
        assert!(priorities.contains(&"HIGH"));
        assert!(priorities.contains(&"LOW"));
    }

    #[tokio::test]
    async fn test_burst_of_likes_groups_into_one() {
        let p = pipeline(300);
        let mut rx = attach_connection(&p.registry, "u1").await;

        let mut first = event("like", "u1", "a1", "Alice");
        first.related_id = "p1".to_string();
        let mut second = event("like", "u1", "a2", "Bob");
        second.related_id = "p1".to_string();
        let mut third = event("like", "u1", "a3", "Carol");
        third.related_id = "p1".to_string();

        process(&p.ctx, &first).await;
        process(&p.ctx, &second).await;
        process(&p.ctx, &third).await;

        let (stored, total) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(stored[0].group_count(), 3);
        // Anchored on the first actor of the burst.
        assert_eq!(stored[0].message, "Alice and 2 others liked your post");

        assert_eq!(next_frame(&mut rx).await["event"], "notification:new");
        assert_eq!(
            next_frame(&mut rx).await["event"],
            "notification:unread-count"
        );
        let update1 = next_frame(&mut rx).await;
        assert_eq!(update1["event"], "notification:updated");
        assert_eq!(update1["payload"]["message"], "Alice and 1 other liked your post");
        let update2 = next_frame(&mut rx).await;
        assert_eq!(update2["event"], "notification:updated");
        assert_eq!(update2["payload"]["metadata"]["groupCount"], 3);
    }

    #[tokio::test]
    async fn test_distinct_dedup_keys_do_not_group() {
        let p = pipeline(300);

        let mut on_post1 = event("like", "u1", "a1", "Alice");
        on_post1.related_id = "p1".to_string();
        let mut on_post2 = event("like", "u1", "a1", "Alice");
        on_post2.related_id = "p2".to_string();
        // Same actor, same user, different kind.
        let view = event("profile-view", "u1", "a1", "Alice");

        process(&p.ctx, &on_post1).await;
        process(&p.ctx, &on_post2).await;
        process(&p.ctx, &view).await;

        let (_, total) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_dedup_window_expiry_creates_fresh_notification() {
        let p = pipeline(1);

        let mut like = event("like", "u1", "a1", "Alice");
        like.related_id = "p1".to_string();

        process(&p.ctx, &like).await;
        tokio::time::sleep(std::time::Duration::from_millis(1200)).await;
        process(&p.ctx, &like).await;

        let (stored, total) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        assert_eq!(total, 2);
        assert!(stored.iter().all(|n| n.group_count() == 1));
    }

    #[tokio::test]
    async fn test_raced_out_dedup_target_falls_back_to_create() {
        let p = pipeline(300);

        // Dedup key points at a notification that no longer exists.
        let key = beacon_cache::keys::dedup("like", "u1", "a1", Some("p1"));
        p.cache
            .set(
                &key,
                &uuid::Uuid::new_v4().to_string(),
                std::time::Duration::from_secs(300),
            )
            .await
            .unwrap();

        let mut like = event("like", "u1", "a1", "Alice");
        like.related_id = "p1".to_string();
        process(&p.ctx, &like).await;

        let (stored, total) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(stored[0].group_count(), 1);
        assert_eq!(stored[0].message, "Alice liked your post");
    }

    #[tokio::test]
    async fn test_disabled_kind_is_dropped_before_store_write() {
        let p = pipeline(300);

        let mut toggles = HashMap::new();
        toggles.insert("like".to_string(), false);
        p.preferences
            .update(
                "u1",
                PreferencesPatch {
                    notifications: Some(toggles),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        process(&p.ctx, &event("like", "u1", "a1", "Alice")).await;
        process(&p.ctx, &event("message", "u1", "a1", "Alice")).await;

        let (stored, total) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(stored[0].kind, "message");
    }

    #[tokio::test]
    async fn test_malformed_and_invalid_events_are_dropped() {
        let p = pipeline(300);

        process_event(&p.ctx, "not json").await.unwrap();
        process_event(&p.ctx, "").await.unwrap();

        // Unknown kind.
        process(&p.ctx, &event("poke", "u1", "a1", "Alice")).await;

        // Missing required fields.
        let mut incomplete = event("message", "u1", "a1", "Alice");
        incomplete.actor_name.clear();
        process(&p.ctx, &incomplete).await;

        let (_, total) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_offline_recipient_still_persists() {
        let p = pipeline(300);

        // No connection registered for u2.
        process(&p.ctx, &event("message", "u2", "a1", "Alice")).await;

        let (stored, total) = p.store.find_by_user("u2", 20, 0, false).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(stored[0].message, "Alice sent you a message");
        assert!(!p.registry.has_local_connection("u2"));
    }

    #[tokio::test]
    async fn test_event_metadata_is_preserved_and_tagged() {
        let p = pipeline(300);

        let mut with_meta = event("message", "u1", "a1", "Alice");
        with_meta.metadata = Some(serde_json::json!({ "conversationId": "c1" }));
        process(&p.ctx, &with_meta).await;

        let (stored, _) = p.store.find_by_user("u1", 20, 0, false).await.unwrap();
        assert_eq!(stored[0].metadata["conversationId"], "c1");
        assert_eq!(stored[0].metadata["groupCount"], 1);
    }
}
