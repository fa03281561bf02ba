//! Response payloads.

use serde::Serialize;

use beacon_entity::notification::{Notification, NotificationStatistics};

/// Paged notification listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    /// Notifications on this page, newest first.
    pub notifications: Vec<Notification>,
    /// Total number of pages under the current filter.
    pub total_pages: i64,
    /// The requested (zero-based) page.
    pub current_page: i64,
    /// Total notifications under the current filter.
    pub total_notifications: i64,
}

impl NotificationPage {
    /// Assemble a page from store results.
    pub fn new(notifications: Vec<Notification>, page: i64, size: i64, total: i64) -> Self {
        Self {
            notifications,
            total_pages: (total + size - 1) / size,
            current_page: page,
            total_notifications: total,
        }
    }
}

/// `{"count": n}` payload.
#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    /// Unread notification count.
    pub count: i64,
}

/// `{"statistics": [...]}` payload.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsResponse {
    /// Per-type aggregates.
    pub statistics: Vec<NotificationStatistics>,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Build a confirmation message.
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Health probe payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let page = NotificationPage::new(Vec::new(), 0, 20, 41);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_notifications, 41);

        let empty = NotificationPage::new(Vec::new(), 0, 20, 0);
        assert_eq!(empty.total_pages, 0);

        let exact = NotificationPage::new(Vec::new(), 1, 20, 40);
        assert_eq!(exact.total_pages, 2);
    }
}
