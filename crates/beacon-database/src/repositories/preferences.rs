//! Preferences store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::info;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;
use beacon_core::traits::store::PreferencesStore;
use beacon_entity::preferences::{PreferencesPatch, QuietHours, UserPreferences};

/// PostgreSQL-backed preferences store.
#[derive(Debug, Clone)]
pub struct PreferencesRepository {
    pool: PgPool,
}

impl PreferencesRepository {
    /// Create a new preferences repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find(&self, user_id: &str) -> AppResult<Option<UserPreferences>> {
        sqlx::query_as::<_, UserPreferences>(
            "SELECT * FROM user_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load preferences", e))
    }
}

#[async_trait]
impl PreferencesStore for PreferencesRepository {
    async fn get_or_create(&self, user_id: &str) -> AppResult<UserPreferences> {
        if let Some(preferences) = self.find(user_id).await? {
            return Ok(preferences);
        }

        info!(user_id = %user_id, "Creating default notification preferences");

        // A concurrent first access may insert first; the conflict clause
        // makes that harmless and the re-read picks up the winner.
        let inserted = sqlx::query_as::<_, UserPreferences>(
            "INSERT INTO user_preferences \
             (user_id, notifications, email_notifications, push_notifications, quiet_hours) \
             VALUES ($1, $2, TRUE, TRUE, $3) \
             ON CONFLICT (user_id) DO NOTHING \
             RETURNING *",
        )
        .bind(user_id)
        .bind(Json(UserPreferences::default_toggles()))
        .bind(Json(QuietHours::default()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create preferences", e)
        })?;

        match inserted {
            Some(preferences) => Ok(preferences),
            None => self.find(user_id).await?.ok_or_else(|| {
                AppError::database("Preferences vanished after concurrent insert")
            }),
        }
    }

    async fn update(&self, user_id: &str, patch: PreferencesPatch) -> AppResult<UserPreferences> {
        let mut preferences = self.get_or_create(user_id).await?;
        preferences.apply(patch);

        sqlx::query_as::<_, UserPreferences>(
            "UPDATE user_preferences \
             SET notifications = $1, \
                 email_notifications = $2, \
                 push_notifications = $3, \
                 quiet_hours = $4, \
                 updated_at = NOW() \
             WHERE user_id = $5 \
             RETURNING *",
        )
        .bind(&preferences.notifications)
        .bind(preferences.email_notifications)
        .bind(preferences.push_notifications)
        .bind(&preferences.quiet_hours)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update preferences", e)
        })
    }
}
