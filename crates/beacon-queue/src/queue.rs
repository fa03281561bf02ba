//! Queue engine over the durable stream.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::info;

use beacon_cache::EventStream;
use beacon_core::result::AppResult;
use beacon_entity::notification::{NotificationEvent, NotificationKind};

use crate::priority::policy_for;
use crate::worker::{QueueWorker, WorkerContext};

/// Producer and worker-pool side of the notification queue.
#[derive(Debug)]
pub struct QueueService {
    stream: Arc<EventStream>,
    ctx: Arc<WorkerContext>,
    workers: usize,
}

impl QueueService {
    /// Create a new queue service.
    pub fn new(stream: Arc<EventStream>, ctx: Arc<WorkerContext>, workers: usize) -> Self {
        Self {
            stream,
            ctx,
            workers,
        }
    }

    /// Create the consumer group and spawn the worker pool.
    pub async fn start(&self, cancel: watch::Receiver<bool>) -> AppResult<()> {
        info!("Starting notification queue processors...");

        self.stream.ensure_group().await?;

        for n in 0..self.workers {
            let worker = QueueWorker::new(
                format!("worker-{n}"),
                Arc::clone(&self.stream),
                Arc::clone(&self.ctx),
            );
            tokio::spawn(worker.run(cancel.clone()));
        }

        info!(workers = self.workers, "Queue processors started");
        Ok(())
    }

    /// Append an event to the durable stream.
    ///
    /// The kind's ingress delay is applied here, on the producer side:
    /// it opens the window in which late likes/views collapse into the
    /// first-arrived notification.
    pub async fn enqueue(&self, event: &NotificationEvent) -> AppResult<()> {
        if let Some(kind) = NotificationKind::parse(&event.kind) {
            let delay = policy_for(kind).delay;
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }

        let payload = serde_json::to_string(event)?;
        self.stream.append(&payload).await?;

        info!(
            kind = %event.kind,
            user_id = %event.user_id,
            "Queued notification"
        );
        Ok(())
    }
}
