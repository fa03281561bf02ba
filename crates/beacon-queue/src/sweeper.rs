//! Periodic removal of expired notifications.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info};

use beacon_core::traits::store::NotificationStore;

/// Sweep cadence. Read paths already hide expired rows, so the sweep
/// only has to keep the table from growing.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Background task deleting notifications past their expiry.
#[derive(Debug)]
pub struct ExpirySweeper {
    store: Arc<dyn NotificationStore>,
}

impl ExpirySweeper {
    /// Create a new sweeper.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Run the sweep loop until the cancel signal fires.
    pub async fn run(self, mut cancel: watch::Receiver<bool>) {
        let mut ticker = interval(SWEEP_INTERVAL);
        // Skip the immediate first tick.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Expiry sweeper shutting down");
                        return;
                    }
                }
                _ = ticker.tick() => {
                    match self.store.purge_expired(Utc::now()).await {
                        Ok(0) => {}
                        Ok(count) => info!(count, "Purged expired notifications"),
                        Err(e) => error!(error = %e, "Expiry sweep failed"),
                    }
                }
            }
        }
    }
}
