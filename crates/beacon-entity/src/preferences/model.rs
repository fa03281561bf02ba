//! User preferences entity and patch semantics.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Daily window during which delivery channels stay quiet.
///
/// `start`/`end` are local wall-clock times in `"HH:MM"` form. The window
/// wraps midnight iff `start > end` lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    /// Whether quiet hours are active at all.
    pub enabled: bool,
    /// Window start, `"HH:MM"`.
    pub start: String,
    /// Window end, `"HH:MM"`.
    pub end: String,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "22:00".to_string(),
            end: "08:00".to_string(),
        }
    }
}

impl QuietHours {
    /// Whether the given `"HH:MM"` time falls inside the window.
    pub fn contains(&self, current: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let start = self.start.as_str();
        let end = self.end.as_str();
        if start > end {
            // Window spans midnight.
            current >= start || current < end
        } else {
            current >= start && current < end
        }
    }
}

/// Per-user notification delivery preferences.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Row identifier.
    pub id: Uuid,
    /// The user these preferences belong to.
    pub user_id: String,
    /// Per-type toggles; an absent type counts as enabled.
    pub notifications: Json<HashMap<String, bool>>,
    /// Whether email delivery is enabled.
    pub email_notifications: bool,
    /// Whether push delivery is enabled.
    pub push_notifications: bool,
    /// Quiet hours window.
    pub quiet_hours: Json<QuietHours>,
    /// When the preferences were created.
    pub created_at: DateTime<Utc>,
    /// When the preferences were last updated.
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    /// The toggle map used for freshly created preferences.
    pub fn default_toggles() -> HashMap<String, bool> {
        [
            "like",
            "message",
            "profile-view",
            "friend-post",
            "friend-request",
        ]
        .into_iter()
        .map(|kind| (kind.to_string(), true))
        .collect()
    }

    /// Whether notifications of the given kind are enabled.
    ///
    /// An absent key means the kind was never toggled and is enabled.
    pub fn is_enabled(&self, kind: &str) -> bool {
        self.notifications.get(kind).copied().unwrap_or(true)
    }

    /// Whether the local wall clock currently falls inside quiet hours.
    pub fn is_in_quiet_hours(&self) -> bool {
        let current = Local::now().format("%H:%M").to_string();
        self.quiet_hours.contains(&current)
    }

    /// Merge a partial update into these preferences.
    ///
    /// The toggle map replaces wholesale iff the patch carries a non-empty
    /// one; booleans and quiet hours replace whenever present.
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(toggles) = patch.notifications {
            if !toggles.is_empty() {
                self.notifications = Json(toggles);
            }
        }
        if let Some(email) = patch.email_notifications {
            self.email_notifications = email;
        }
        if let Some(push) = patch.push_notifications {
            self.push_notifications = push;
        }
        if let Some(quiet) = patch.quiet_hours {
            self.quiet_hours = Json(quiet);
        }
    }
}

/// Partial preferences update from the REST surface.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    /// Replacement toggle map; ignored when empty.
    #[serde(default)]
    pub notifications: Option<HashMap<String, bool>>,
    /// New email toggle.
    #[serde(default)]
    pub email_notifications: Option<bool>,
    /// New push toggle.
    #[serde(default)]
    pub push_notifications: Option<bool>,
    /// New quiet hours window.
    #[serde(default)]
    pub quiet_hours: Option<QuietHours>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> UserPreferences {
        UserPreferences {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            notifications: Json(UserPreferences::default_toggles()),
            email_notifications: true,
            push_notifications: true,
            quiet_hours: Json(QuietHours::default()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_enabled_defaults_to_true() {
        let mut p = prefs();
        assert!(p.is_enabled("like"));
        assert!(p.is_enabled("unknown-type"));

        p.notifications.0.insert("like".to_string(), false);
        assert!(!p.is_enabled("like"));
        assert!(p.is_enabled("message"));
    }

    #[test]
    fn test_quiet_hours_disabled() {
        let window = QuietHours {
            enabled: false,
            start: "00:00".to_string(),
            end: "23:59".to_string(),
        };
        assert!(!window.contains("12:00"));
    }

    #[test]
    fn test_quiet_hours_same_day_window() {
        let window = QuietHours {
            enabled: true,
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        };
        assert!(window.contains("09:00"));
        assert!(window.contains("12:30"));
        assert!(!window.contains("17:00"));
        assert!(!window.contains("08:59"));
    }

    #[test]
    fn test_quiet_hours_wraps_midnight() {
        let window = QuietHours {
            enabled: true,
            start: "22:00".to_string(),
            end: "08:00".to_string(),
        };
        assert!(window.contains("23:15"));
        assert!(window.contains("22:00"));
        assert!(window.contains("03:00"));
        assert!(!window.contains("08:00"));
        assert!(!window.contains("12:00"));
    }

    #[test]
    fn test_apply_replaces_toggles_only_when_non_empty() {
        let mut p = prefs();
        p.apply(PreferencesPatch {
            notifications: Some(HashMap::new()),
            ..Default::default()
        });
        assert_eq!(p.notifications.len(), 5);

        let mut toggles = HashMap::new();
        toggles.insert("like".to_string(), false);
        p.apply(PreferencesPatch {
            notifications: Some(toggles),
            ..Default::default()
        });
        assert_eq!(p.notifications.len(), 1);
        assert!(!p.is_enabled("like"));
    }

    #[test]
    fn test_apply_scalars_and_quiet_hours() {
        let mut p = prefs();
        p.apply(PreferencesPatch {
            email_notifications: Some(false),
            quiet_hours: Some(QuietHours {
                enabled: true,
                start: "21:00".to_string(),
                end: "07:00".to_string(),
            }),
            ..Default::default()
        });
        assert!(!p.email_notifications);
        assert!(p.push_notifications);
        assert!(p.quiet_hours.enabled);
        assert_eq!(p.quiet_hours.start, "21:00");
    }
}
