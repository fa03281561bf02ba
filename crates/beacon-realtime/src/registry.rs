//! Socket registry — owns the live per-user connections of this process.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::connection::{ConnectionHandle, ConnectionId};
use crate::frame::{EVENT_UNREAD_COUNT, Frame, Outbound};
use crate::presence::PresenceTracker;

/// Maps `user_id → connection` for this process.
///
/// At most one live connection per user: a second registration closes
/// and evicts the first (last-writer-wins). Fan-out callers go through
/// [`send_to_user`](Self::send_to_user); a user without a local
/// connection is silently skipped since the notification is persisted
/// and will surface on the next REST fetch.
#[derive(Debug)]
pub struct SocketRegistry {
    /// Live connections keyed by user id.
    clients: DashMap<String, Arc<ConnectionHandle>>,
    /// Shared presence mirror.
    presence: PresenceTracker,
}

impl SocketRegistry {
    /// Creates a new registry.
    pub fn new(presence: PresenceTracker) -> Self {
        Self {
            clients: DashMap::new(),
            presence,
        }
    }

    /// Registers a connection, evicting any previous one for the user.
    pub async fn register(&self, handle: Arc<ConnectionHandle>) {
        let user_id = handle.user_id.clone();

        if let Some(previous) = self.clients.insert(user_id.clone(), handle.clone()) {
            warn!(
                user_id = %user_id,
                old_conn = %previous.id,
                new_conn = %handle.id,
                "Replacing existing connection"
            );
            previous.mark_closed();
        }

        self.presence.set_online(&user_id).await;

        info!(conn_id = %handle.id, user_id = %user_id, "User connected");
    }

    /// Unregisters whatever connection the user currently has. Idempotent.
    pub async fn unregister(&self, user_id: &str) {
        if let Some((_, handle)) = self.clients.remove(user_id) {
            handle.mark_closed();
            info!(conn_id = %handle.id, user_id = %user_id, "User disconnected");
        }
        self.presence.set_offline(user_id).await;
    }

    /// Unregisters a specific connection, leaving any replacement alone.
    ///
    /// Used by the liveness probe and the socket tasks, which may
    /// outlive their own eviction under last-writer-wins.
    pub async fn unregister_conn(&self, user_id: &str, conn_id: ConnectionId) {
        let removed = self
            .clients
            .remove_if(user_id, |_, handle| handle.id == conn_id);

        if let Some((_, handle)) = removed {
            handle.mark_closed();
            self.presence.set_offline(user_id).await;
            info!(conn_id = %conn_id, user_id = %user_id, "User disconnected");
        }
    }

    /// Sends an event frame to a user's local connection, if any.
    pub async fn send_to_user(&self, user_id: &str, event: &str, payload: &impl Serialize) {
        let Some(handle) = self.clients.get(user_id).map(|entry| entry.value().clone()) else {
            debug!(user_id = %user_id, event = %event, "User offline, notification stored only");
            return;
        };

        let text = match Frame::new(event, payload).and_then(|frame| frame.to_text()) {
            Ok(text) => text,
            Err(e) => {
                error!(event = %event, error = %e, "Failed to serialize frame");
                return;
            }
        };

        if let Err(e) = handle.send(Outbound::Frame(text)).await {
            warn!(user_id = %user_id, conn_id = %handle.id, error = %e, "Failed to queue frame");
            self.unregister_conn(user_id, handle.id).await;
            return;
        }

        debug!(user_id = %user_id, event = %event, "Frame queued");
    }

    /// Pushes the authoritative unread counter to a user.
    pub async fn send_unread_count(&self, user_id: &str, count: i64) {
        self.send_to_user(user_id, EVENT_UNREAD_COUNT, &serde_json::json!({ "count": count }))
            .await;
    }

    /// Whether the user is connected to any instance (shared view).
    pub async fn is_user_online(&self, user_id: &str) -> bool {
        self.presence.is_online(user_id).await
    }

    /// Whether this process owns a connection for the user.
    pub fn has_local_connection(&self, user_id: &str) -> bool {
        self.clients.contains_key(user_id)
    }

    /// Number of connections owned by this process.
    pub fn connection_count(&self) -> usize {
        self.clients.len()
    }

    /// Closes every connection owned by this process.
    ///
    /// Used during shutdown so open sockets do not hold the server's
    /// connection drain forever.
    pub async fn close_all(&self) {
        let users: Vec<String> = self
            .clients
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        let count = users.len();
        for user_id in users {
            self.unregister(&user_id).await;
        }

        if count > 0 {
            info!(count, "All connections closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_cache::memory::MemoryCacheProvider;
    use beacon_core::traits::cache::CacheProvider;
    use tokio::sync::mpsc;

    fn registry() -> SocketRegistry {
        let cache: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::new());
        SocketRegistry::new(PresenceTracker::new(cache))
    }

    fn handle(user: &str) -> (Arc<ConnectionHandle>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(16);
        (Arc::new(ConnectionHandle::new(user, tx)), rx)
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let registry = registry();
        let (first, _rx1) = handle("u1");
        let (second, mut rx2) = handle("u1");

        registry.register(first.clone()).await;
        registry.register(second.clone()).await;

        assert!(!first.is_alive());
        assert!(second.is_alive());
        assert_eq!(registry.connection_count(), 1);

        registry.send_to_user("u1", "notification:new", &serde_json::json!({"id": 1})).await;
        assert!(matches!(rx2.recv().await, Some(Outbound::Frame(_))));
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = registry();
        let (conn, _rx) = handle("u1");

        registry.register(conn.clone()).await;
        registry.unregister("u1").await;
        registry.unregister("u1").await;

        assert!(!conn.is_alive());
        assert!(!registry.has_local_connection("u1"));
        assert!(!registry.is_user_online("u1").await);
    }

    #[tokio::test]
    async fn test_stale_conn_unregister_keeps_replacement() {
        let registry = registry();
        let (first, _rx1) = handle("u1");
        let (second, _rx2) = handle("u1");

        registry.register(first.clone()).await;
        registry.register(second.clone()).await;

        // The evicted connection's cleanup must not tear down the new one.
        registry.unregister_conn("u1", first.id).await;

        assert!(registry.has_local_connection("u1"));
        assert!(registry.is_user_online("u1").await);
        assert!(second.is_alive());
    }

    #[tokio::test]
    async fn test_send_to_offline_user_is_silent() {
        let registry = registry();
        registry.send_to_user("ghost", "notification:new", &serde_json::json!({})).await;
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_unread_count_frame_shape() {
        let registry = registry();
        let (conn, mut rx) = handle("u1");
        registry.register(conn).await;

        registry.send_unread_count("u1", 7).await;

        let Some(Outbound::Frame(text)) = rx.recv().await else {
            panic!("expected a frame");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event"], "notification:unread-count");
        assert_eq!(value["payload"]["count"], 7);
    }

    #[tokio::test]
    async fn test_send_failure_unregisters() {
        let registry = registry();
        let (conn, rx) = handle("u1");
        registry.register(conn.clone()).await;

        // Dropping the receiver makes the next queue attempt fail.
        drop(rx);
        registry.send_to_user("u1", "notification:new", &serde_json::json!({})).await;

        assert!(!registry.has_local_connection("u1"));
        assert!(!conn.is_alive());
    }
}
