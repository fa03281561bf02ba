//! Notification kind enumeration and channel mapping.

use serde::{Deserialize, Serialize};

/// Kind of a notification, mirroring the pub/sub channel it originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    /// Someone liked the recipient's post.
    Like,
    /// Someone sent the recipient a direct message.
    Message,
    /// Someone viewed the recipient's profile.
    ProfileView,
    /// A friend shared a new post.
    FriendPost,
    /// Someone sent the recipient a friend request.
    FriendRequest,
}

impl NotificationKind {
    /// All kinds, in priority order.
    pub const ALL: [Self; 5] = [
        Self::Message,
        Self::FriendRequest,
        Self::Like,
        Self::ProfileView,
        Self::FriendPost,
    ];

    /// Return the kind as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Message => "message",
            Self::ProfileView => "profile-view",
            Self::FriendPost => "friend-post",
            Self::FriendRequest => "friend-request",
        }
    }

    /// Parse a wire string into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(Self::Like),
            "message" => Some(Self::Message),
            "profile-view" => Some(Self::ProfileView),
            "friend-post" => Some(Self::FriendPost),
            "friend-request" => Some(Self::FriendRequest),
            _ => None,
        }
    }

    /// The pub/sub channel this kind is published on.
    pub fn channel(&self) -> String {
        format!("notification:{}", self.as_str())
    }

    /// Resolve a pub/sub channel name back to a kind.
    ///
    /// The channel is authoritative for the event type; the payload's own
    /// `type` field is ignored by the listener.
    pub fn from_channel(channel: &str) -> Option<Self> {
        channel
            .strip_prefix("notification:")
            .and_then(Self::parse)
    }

    /// Whether events of this kind are deduplicated and grouped.
    pub fn groupable(&self) -> bool {
        matches!(self, Self::Like | Self::ProfileView)
    }

    /// Default message when the publisher did not provide one.
    pub fn default_message(&self, actor_name: &str) -> String {
        match self {
            Self::Like => format!("{actor_name} liked your post"),
            Self::Message => format!("{actor_name} sent you a message"),
            Self::ProfileView => format!("{actor_name} viewed your profile"),
            Self::FriendPost => format!("{actor_name} shared a new post"),
            Self::FriendRequest => format!("{actor_name} sent you a friend request"),
        }
    }

    /// Verb used when rewriting a grouped notification message.
    pub fn action_verb(&self) -> &'static str {
        match self {
            Self::Like => "liked",
            Self::ProfileView => "viewed",
            _ => "interacted with",
        }
    }

    /// Noun used when rewriting a grouped notification message.
    pub fn target_noun(&self) -> &'static str {
        match self {
            Self::Like => "post",
            Self::ProfileView => "profile",
            _ => "content",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_round_trip() {
        for kind in NotificationKind::ALL {
            assert_eq!(NotificationKind::from_channel(&kind.channel()), Some(kind));
        }
    }

    #[test]
    fn test_from_channel_rejects_unknown() {
        assert_eq!(NotificationKind::from_channel("notification:poke"), None);
        assert_eq!(NotificationKind::from_channel("like"), None);
    }

    #[test]
    fn test_default_messages() {
        assert_eq!(
            NotificationKind::Like.default_message("Alice"),
            "Alice liked your post"
        );
        assert_eq!(
            NotificationKind::Message.default_message("Alice"),
            "Alice sent you a message"
        );
        assert_eq!(
            NotificationKind::ProfileView.default_message("Bob"),
            "Bob viewed your profile"
        );
        assert_eq!(
            NotificationKind::FriendPost.default_message("Bob"),
            "Bob shared a new post"
        );
        assert_eq!(
            NotificationKind::FriendRequest.default_message("Eve"),
            "Eve sent you a friend request"
        );
    }

    #[test]
    fn test_groupable() {
        assert!(NotificationKind::Like.groupable());
        assert!(NotificationKind::ProfileView.groupable());
        assert!(!NotificationKind::Message.groupable());
        assert!(!NotificationKind::FriendRequest.groupable());
        assert!(!NotificationKind::FriendPost.groupable());
    }
}
