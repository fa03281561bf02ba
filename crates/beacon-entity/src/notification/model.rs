//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata key carrying the number of coalesced events.
pub const GROUP_COUNT_KEY: &str = "groupCount";

/// A persistent notification delivered to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: String,
    /// Notification kind (wire value, e.g. `"like"`).
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    /// The user who triggered the event.
    pub actor_id: String,
    /// Display name of the actor.
    pub actor_name: String,
    /// Avatar URL of the actor.
    pub actor_picture: String,
    /// Target object of the event (e.g. a post id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    /// Human-readable message; rewritten when events are grouped.
    pub message: String,
    /// Whether the user has read this notification.
    pub read: bool,
    /// Priority level (`"HIGH"`, `"MEDIUM"`, `"LOW"`).
    pub priority: String,
    /// Free-form metadata; always carries `groupCount >= 1`.
    pub metadata: serde_json::Value,
    /// When the notification becomes invisible and eligible for deletion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Number of events coalesced into this notification (at least 1).
    pub fn group_count(&self) -> i64 {
        self.metadata
            .get(GROUP_COUNT_KEY)
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(1)
    }

    /// Overwrite the group count, initializing metadata if needed.
    pub fn set_group_count(&mut self, count: i64) {
        if !self.metadata.is_object() {
            self.metadata = serde_json::json!({});
        }
        if let Some(map) = self.metadata.as_object_mut() {
            map.insert(GROUP_COUNT_KEY.to_string(), serde_json::json!(count));
        }
    }

    /// Whether more than one event has been folded into this notification.
    pub fn is_grouped(&self) -> bool {
        self.group_count() > 1
    }

    /// Whether the notification has passed its expiry timestamp.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

/// Parameters for creating a notification.
///
/// The store assigns `id`, `created_at`, `updated_at`, and the default
/// expiry when `expires_at` is not set.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// The recipient user.
    pub user_id: String,
    /// Notification kind (wire value).
    pub kind: String,
    /// The user who triggered the event.
    pub actor_id: String,
    /// Display name of the actor.
    pub actor_name: String,
    /// Avatar URL of the actor.
    pub actor_picture: String,
    /// Target object of the event.
    pub related_id: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Priority level string.
    pub priority: String,
    /// Metadata; the queue engine guarantees `groupCount` is present.
    pub metadata: serde_json::Value,
    /// Optional explicit expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Per-type aggregate counters for one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStatistics {
    /// Notification kind.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Total notifications of this kind.
    pub count: i64,
    /// Unread notifications of this kind.
    pub unread: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            kind: "like".to_string(),
            actor_id: "a1".to_string(),
            actor_name: "Alice".to_string(),
            actor_picture: String::new(),
            related_id: Some("p1".to_string()),
            message: "Alice liked your post".to_string(),
            read: false,
            priority: "MEDIUM".to_string(),
            metadata: serde_json::json!({ "groupCount": 1 }),
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_count_default() {
        let mut n = sample();
        n.metadata = serde_json::json!({});
        assert_eq!(n.group_count(), 1);
        n.metadata = serde_json::Value::Null;
        assert_eq!(n.group_count(), 1);
    }

    #[test]
    fn test_set_group_count_initializes_metadata() {
        let mut n = sample();
        n.metadata = serde_json::Value::Null;
        n.set_group_count(3);
        assert_eq!(n.group_count(), 3);
        assert!(n.is_grouped());
    }

    #[test]
    fn test_serializes_camel_case() {
        let n = sample();
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "like");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["actorName"], "Alice");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_is_expired() {
        let mut n = sample();
        assert!(!n.is_expired(Utc::now()));
        n.expires_at = Some(Utc::now() - chrono::Duration::seconds(1));
        assert!(n.is_expired(Utc::now()));
    }
}
