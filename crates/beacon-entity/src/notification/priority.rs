//! Notification priority levels.

use serde::{Deserialize, Serialize};

/// Priority of a stored notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Requires prompt attention.
    High,
    /// Standard events.
    Medium,
    /// Background events.
    Low,
}

impl Priority {
    /// Return the priority as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Map the free-form priority string carried on events.
    ///
    /// Anything other than `"high"` or `"low"` falls back to medium.
    pub fn from_event(s: &str) -> Self {
        match s {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_event() {
        assert_eq!(Priority::from_event("high"), Priority::High);
        assert_eq!(Priority::from_event("low"), Priority::Low);
        assert_eq!(Priority::from_event("medium"), Priority::Medium);
        assert_eq!(Priority::from_event(""), Priority::Medium);
        assert_eq!(Priority::from_event("HIGH"), Priority::Medium);
    }
}
