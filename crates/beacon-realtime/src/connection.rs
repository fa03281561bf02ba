//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, mpsc};
use uuid::Uuid;

use crate::frame::Outbound;

/// Deadline for a single socket write; exceeding it is a hard disconnect.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Unique connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Creates a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a single authenticated WebSocket connection.
///
/// All writes flow through `tx` into the connection's single writer
/// task; a socket does not tolerate concurrent writers.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection identifier.
    pub id: ConnectionId,
    /// Authenticated user ID.
    pub user_id: String,
    /// Channel into the single writer task.
    tx: mpsc::Sender<Outbound>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last pong (or registration) timestamp, seconds since epoch.
    last_pong: AtomicI64,
    /// Whether the connection is still alive.
    alive: AtomicBool,
    /// Signalled once when the connection is closed.
    closed: Notify,
}

impl ConnectionHandle {
    /// Creates a new connection handle.
    pub fn new(user_id: &str, tx: mpsc::Sender<Outbound>) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id: user_id.to_string(),
            tx,
            connected_at: Utc::now(),
            last_pong: AtomicI64::new(Utc::now().timestamp()),
            alive: AtomicBool::new(true),
            closed: Notify::new(),
        }
    }

    /// Queues a message for the writer task.
    pub async fn send(&self, message: Outbound) -> Result<(), String> {
        if !self.is_alive() {
            return Err("Connection is closed".to_string());
        }

        self.tx
            .send(message)
            .await
            .map_err(|e| format!("Send failed: {e}"))
    }

    /// Checks whether the connection is still alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Marks the connection as closed and wakes anyone waiting on it.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::Relaxed);
        self.closed.notify_one();
    }

    /// Resolves once the connection has been marked closed.
    pub async fn wait_closed(&self) {
        loop {
            if !self.is_alive() {
                return;
            }
            self.closed.notified().await;
        }
    }

    /// Records a pong from the client.
    pub fn touch_pong(&self) {
        self.last_pong.store(Utc::now().timestamp(), Ordering::Relaxed);
    }

    /// Seconds since the last pong (or since registration).
    pub fn seconds_since_pong(&self) -> i64 {
        Utc::now().timestamp() - self.last_pong.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new("u1", tx);

        handle.send(Outbound::Ping).await.unwrap();
        assert!(matches!(rx.recv().await, Some(Outbound::Ping)));

        handle.mark_closed();
        assert!(handle.send(Outbound::Ping).await.is_err());
    }

    #[tokio::test]
    async fn test_wait_closed_resolves() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = std::sync::Arc::new(ConnectionHandle::new("u1", tx));

        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.wait_closed().await })
        };

        handle.mark_closed();
        waiter.await.unwrap();
    }
}
