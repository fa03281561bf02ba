//! Notification pipeline configuration.

/// Queue, grouping, and expiry settings.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Number of stream consumer workers.
    pub queue_workers: usize,
    /// Sliding dedup window in seconds; also the dedup key TTL.
    pub grouping_window_secs: u64,
    /// Days until a stored notification expires when no explicit
    /// expiry is set.
    pub default_expiry_days: i64,
}

pub(crate) fn default_queue_workers() -> usize {
    3
}

pub(crate) fn default_grouping_window_secs() -> u64 {
    300
}

pub(crate) fn default_expiry_days() -> i64 {
    90
}
