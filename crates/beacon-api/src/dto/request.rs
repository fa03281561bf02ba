//! Request payloads and query parameters.

use serde::Deserialize;

/// Largest page size a caller may request.
const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for `GET /api/notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListNotificationsQuery {
    /// Zero-based page number.
    #[serde(default)]
    pub page: i64,
    /// Page size.
    #[serde(default = "default_size")]
    pub size: i64,
    /// Restrict the listing (and total) to unread notifications.
    #[serde(default, rename = "unreadOnly")]
    pub unread_only: bool,
}

impl ListNotificationsQuery {
    /// Effective page size.
    pub fn limit(&self) -> i64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the effective page.
    pub fn offset(&self) -> i64 {
        self.page.max(0) * self.limit()
    }

    /// Normalized page number.
    pub fn page(&self) -> i64 {
        self.page.max(0)
    }
}

impl Default for ListNotificationsQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_size(),
            unread_only: false,
        }
    }
}

fn default_size() -> i64 {
    20
}

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// JWT access token; falls back to the `Authorization` header.
    #[serde(default)]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query: ListNotificationsQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.page(), 0);
        assert_eq!(query.limit(), 20);
        assert!(!query.unread_only);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_unread_only_rename() {
        let query: ListNotificationsQuery =
            serde_json::from_value(serde_json::json!({ "unreadOnly": true })).unwrap();
        assert!(query.unread_only);
    }

    #[test]
    fn test_offset_and_clamping() {
        let query: ListNotificationsQuery =
            serde_json::from_value(serde_json::json!({ "page": 2, "size": 50 })).unwrap();
        assert_eq!(query.offset(), 100);

        let oversized: ListNotificationsQuery =
            serde_json::from_value(serde_json::json!({ "size": 9999 })).unwrap();
        assert_eq!(oversized.limit(), 100);

        let negative: ListNotificationsQuery =
            serde_json::from_value(serde_json::json!({ "page": -3, "size": 0 })).unwrap();
        assert_eq!(negative.page(), 0);
        assert_eq!(negative.limit(), 1);
    }
}
