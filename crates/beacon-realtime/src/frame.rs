//! Wire frames exchanged with socket clients.

use serde::{Deserialize, Serialize};

use beacon_core::result::AppResult;

/// Server→client event carrying a freshly created notification.
pub const EVENT_NEW: &str = "notification:new";
/// Server→client event carrying a notification rewritten by grouping.
pub const EVENT_UPDATED: &str = "notification:updated";
/// Server→client event carrying the authoritative unread counter.
pub const EVENT_UNREAD_COUNT: &str = "notification:unread-count";

/// A text frame as sent to the client: `{"event": ..., "payload": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Event name, e.g. `notification:new`.
    pub event: String,
    /// Event payload.
    pub payload: serde_json::Value,
}

impl Frame {
    /// Build a frame from an event name and any serializable payload.
    pub fn new(event: &str, payload: &impl Serialize) -> AppResult<Self> {
        Ok(Self {
            event: event.to_string(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Serialize the frame to its wire text.
    pub fn to_text(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Message handed to a connection's single writer task.
///
/// Fan-out callers and the liveness probe both go through this channel,
/// which serializes all socket writes.
#[derive(Debug)]
pub enum Outbound {
    /// A serialized text frame.
    Frame(String),
    /// A liveness ping control frame.
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_wire_shape() {
        let frame = Frame::new(EVENT_UNREAD_COUNT, &serde_json::json!({ "count": 3 })).unwrap();
        let text = frame.to_text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event"], "notification:unread-count");
        assert_eq!(value["payload"]["count"], 3);
    }
}
