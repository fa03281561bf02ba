//! Ping/pong liveness probe for socket connections.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, warn};

use crate::connection::ConnectionHandle;
use crate::frame::Outbound;
use crate::registry::SocketRegistry;

/// Deadline for a pong; a silent client past this is disconnected.
pub const PONG_DEADLINE: Duration = Duration::from_secs(60);
/// Ping cadence, 9/10 of the pong deadline.
pub const PING_INTERVAL: Duration = Duration::from_secs(54);

/// Per-connection liveness probe.
#[derive(Debug)]
pub struct Heartbeat {
    registry: Arc<SocketRegistry>,
}

impl Heartbeat {
    /// Creates a new heartbeat bound to the registry it reports into.
    pub fn new(registry: Arc<SocketRegistry>) -> Self {
        Self { registry }
    }

    /// Runs the liveness loop for one connection.
    ///
    /// Returns when the connection dies: pong deadline exceeded, ping
    /// write failed, or the connection was closed elsewhere.
    pub async fn run(&self, handle: Arc<ConnectionHandle>) {
        let mut ticker = interval(PING_INTERVAL);
        // The first tick completes immediately; skip it so the first
        // ping goes out one interval after registration.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if !handle.is_alive() {
                debug!(conn_id = %handle.id, "Connection closed, stopping heartbeat");
                return;
            }

            let silent_for = handle.seconds_since_pong();
            if silent_for > PONG_DEADLINE.as_secs() as i64 {
                warn!(
                    conn_id = %handle.id,
                    user_id = %handle.user_id,
                    silent_seconds = silent_for,
                    "Pong deadline exceeded, disconnecting"
                );
                self.registry
                    .unregister_conn(&handle.user_id, handle.id)
                    .await;
                return;
            }

            if let Err(e) = handle.send(Outbound::Ping).await {
                warn!(
                    conn_id = %handle.id,
                    user_id = %handle.user_id,
                    error = %e,
                    "Failed to send ping, disconnecting"
                );
                self.registry
                    .unregister_conn(&handle.user_id, handle.id)
                    .await;
                return;
            }

            debug!(conn_id = %handle.id, "Ping sent");
        }
    }
}
