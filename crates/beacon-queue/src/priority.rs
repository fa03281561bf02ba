//! Priority and ingress-delay policy per notification kind.

use std::time::Duration;

use beacon_entity::notification::NotificationKind;

/// Queueing policy for one notification kind.
///
/// The stream itself is FIFO; immediate kinds win only because they
/// skip the delay. The delay doubles as the window in which late
/// likes/views collapse into the first-arrived notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePolicy {
    /// Numeric rank, 1 = highest.
    pub rank: u8,
    /// Producer-side delay before the stream append.
    pub delay: Duration,
}

/// Look up the policy for a kind.
pub fn policy_for(kind: NotificationKind) -> QueuePolicy {
    match kind {
        NotificationKind::Message => QueuePolicy {
            rank: 1,
            delay: Duration::ZERO,
        },
        NotificationKind::FriendRequest => QueuePolicy {
            rank: 2,
            delay: Duration::ZERO,
        },
        NotificationKind::Like => QueuePolicy {
            rank: 3,
            delay: Duration::from_secs(2),
        },
        NotificationKind::ProfileView => QueuePolicy {
            rank: 4,
            delay: Duration::from_secs(3),
        },
        NotificationKind::FriendPost => QueuePolicy {
            rank: 5,
            delay: Duration::from_secs(5),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_kinds_have_no_delay() {
        assert_eq!(policy_for(NotificationKind::Message).delay, Duration::ZERO);
        assert_eq!(
            policy_for(NotificationKind::FriendRequest).delay,
            Duration::ZERO
        );
    }

    #[test]
    fn test_delayed_kinds() {
        assert_eq!(
            policy_for(NotificationKind::Like).delay,
            Duration::from_secs(2)
        );
        assert_eq!(
            policy_for(NotificationKind::ProfileView).delay,
            Duration::from_secs(3)
        );
        assert_eq!(
            policy_for(NotificationKind::FriendPost).delay,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_ranks_are_distinct_and_ordered() {
        let ranks: Vec<u8> = NotificationKind::ALL
            .into_iter()
            .map(|kind| policy_for(kind).rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }
}
