//! Cache key builders for all Beacon cache entries.
//!
//! Centralising key construction prevents typos and makes it easy to
//! find every key the application uses.

/// Durable stream the queue engine appends events to.
pub const QUEUE_STREAM: &str = "notifications:queue";

/// Consumer group the queue workers read through.
pub const CONSUMER_GROUP: &str = "notification-processors";

/// Stream field carrying the JSON-encoded event.
pub const STREAM_DATA_FIELD: &str = "data";

// ── Presence keys ──────────────────────────────────────────

/// Set of currently connected user ids, shared across instances.
pub fn online_users() -> String {
    "notification:online".to_string()
}

/// Per-user presence marker, held with a 24 h TTL.
pub fn socket_marker(user_id: &str) -> String {
    format!("notification:socket:{user_id}")
}

// ── Dedup keys ─────────────────────────────────────────────

/// Deduplication key for an event's coalescing bucket.
///
/// An empty related id collapses to the literal `"none"`.
pub fn dedup(kind: &str, user_id: &str, actor_id: &str, related_id: Option<&str>) -> String {
    let related = match related_id {
        Some(id) if !id.is_empty() => id,
        _ => "none",
    };
    format!("notification:dedup:{kind}:{user_id}:{actor_id}:{related}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key() {
        assert_eq!(
            dedup("like", "u1", "a1", Some("p1")),
            "notification:dedup:like:u1:a1:p1"
        );
    }

    #[test]
    fn test_dedup_key_without_related_id() {
        assert_eq!(
            dedup("profile-view", "u1", "a1", None),
            "notification:dedup:profile-view:u1:a1:none"
        );
        assert_eq!(
            dedup("profile-view", "u1", "a1", Some("")),
            "notification:dedup:profile-view:u1:a1:none"
        );
    }

    #[test]
    fn test_presence_keys() {
        assert_eq!(online_users(), "notification:online");
        assert_eq!(socket_marker("u1"), "notification:socket:u1");
    }
}
