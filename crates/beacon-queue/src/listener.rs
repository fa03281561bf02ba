//! Pub/sub event listener — ingress edge of the pipeline.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use beacon_cache::RedisClient;
use beacon_entity::notification::{NotificationEvent, NotificationKind};

use crate::queue::QueueService;

/// Subscribes once to the well-known notification channels and feeds
/// validated events into the queue.
#[derive(Debug)]
pub struct EventListener {
    client: RedisClient,
    queue: Arc<QueueService>,
}

impl EventListener {
    /// Create a new event listener.
    pub fn new(client: RedisClient, queue: Arc<QueueService>) -> Self {
        Self { client, queue }
    }

    /// Run the listener until the cancel signal fires.
    ///
    /// All channels share one multiplexed subscription. No backpressure
    /// is applied to publishers; the durable stream absorbs spikes.
    pub async fn start(self, mut cancel: watch::Receiver<bool>) {
        info!("Starting pub/sub event listener...");

        let mut pubsub = match self.client.pubsub().await {
            Ok(pubsub) => pubsub,
            Err(e) => {
                error!(error = %e, "Failed to open pub/sub connection");
                return;
            }
        };

        let channels: Vec<String> = NotificationKind::ALL
            .into_iter()
            .map(|kind| kind.channel())
            .collect();

        if let Err(e) = pubsub.subscribe(&channels).await {
            error!(error = %e, "Failed to subscribe to notification channels");
            return;
        }

        info!(channels = channels.len(), subscribed = ?channels, "Event listener started");

        let mut messages = pubsub.on_message();
        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Event listener shutting down...");
                        return;
                    }
                }
                message = messages.next() => {
                    let Some(message) = message else {
                        warn!("Pub/sub stream closed");
                        return;
                    };
                    self.handle_message(message);
                }
            }
        }
    }

    /// Validate one inbound message and hand it to the queue.
    fn handle_message(&self, message: redis::Msg) {
        let channel = message.get_channel_name().to_string();
        let payload: String = match message.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Unreadable event payload");
                return;
            }
        };

        debug!(channel = %channel, "Received event");

        let mut event: NotificationEvent = match serde_json::from_str(&payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Failed to parse event payload");
                return;
            }
        };

        if !event.has_required_fields() {
            warn!(channel = %channel, "Dropping event with missing required fields");
            return;
        }

        let Some(kind) = NotificationKind::from_channel(&channel) else {
            warn!(channel = %channel, "Unknown channel");
            return;
        };

        // The channel is authoritative; the payload's own type is ignored.
        event.kind = kind.as_str().to_string();

        if event.message.is_empty() {
            event.message = kind.default_message(&event.actor_name);
        }

        // Enqueue on its own task: the producer-side delay of one kind
        // must not stall the subscription for the others.
        let queue = Arc::clone(&self.queue);
        tokio::spawn(async move {
            if let Err(e) = queue.enqueue(&event).await {
                error!(error = %e, "Failed to queue notification");
            }
        });
    }
}
