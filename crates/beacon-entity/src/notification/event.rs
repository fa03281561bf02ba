//! Transient notification event as published on the bus.

use serde::{Deserialize, Serialize};

/// A domain event received from the pub/sub bus or the durable stream.
///
/// All fields are optional on the wire; the listener drops events that
/// are missing `userId`, `actorId`, or `actorName`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    /// The recipient user.
    #[serde(default)]
    pub user_id: String,
    /// Event type; overwritten by the listener from the channel name.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// The user who triggered the event.
    #[serde(default)]
    pub actor_id: String,
    /// Display name of the actor.
    #[serde(default)]
    pub actor_name: String,
    /// Avatar URL of the actor.
    #[serde(default)]
    pub actor_picture: String,
    /// Target object of the event (e.g. a post id).
    #[serde(default)]
    pub related_id: String,
    /// Message text; synthesized from a template when empty.
    #[serde(default)]
    pub message: String,
    /// Free-form priority hint from the publisher (`"high"`, `"low"`, ...).
    #[serde(default)]
    pub priority: String,
    /// Free-form metadata forwarded onto the stored notification.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl NotificationEvent {
    /// Whether the event carries every field the pipeline requires.
    pub fn has_required_fields(&self) -> bool {
        !self.user_id.is_empty() && !self.actor_id.is_empty() && !self.actor_name.is_empty()
    }

    /// The related id, or `None` when the publisher left it empty.
    pub fn related_id_opt(&self) -> Option<String> {
        if self.related_id.is_empty() {
            None
        } else {
            Some(self.related_id.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let mut event = NotificationEvent {
            user_id: "u1".to_string(),
            actor_id: "a1".to_string(),
            actor_name: "Alice".to_string(),
            ..Default::default()
        };
        assert!(event.has_required_fields());

        event.actor_name.clear();
        assert!(!event.has_required_fields());
    }

    #[test]
    fn test_decodes_partial_payload() {
        let event: NotificationEvent =
            serde_json::from_str(r#"{"userId":"u1","actorId":"a1","actorName":"Alice"}"#).unwrap();
        assert!(event.has_required_fields());
        assert!(event.message.is_empty());
        assert_eq!(event.related_id_opt(), None);
    }

    #[test]
    fn test_related_id_opt() {
        let event = NotificationEvent {
            related_id: "post-9".to_string(),
            ..Default::default()
        };
        assert_eq!(event.related_id_opt(), Some("post-9".to_string()));
    }
}
