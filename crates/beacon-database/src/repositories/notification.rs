//! Notification store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;
use beacon_core::traits::store::NotificationStore;
use beacon_entity::notification::{NewNotification, Notification, NotificationStatistics};

/// Filter shared by every read: expired rows are invisible.
const ALIVE: &str = "(expires_at IS NULL OR expires_at > NOW())";

/// PostgreSQL-backed notification store.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
    /// Days until expiry when a notification carries no explicit one.
    default_expiry_days: i64,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool, default_expiry_days: i64) -> Self {
        Self {
            pool,
            default_expiry_days,
        }
    }

    fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |e| AppError::with_source(ErrorKind::Database, context, e)
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        let expires_at = new
            .expires_at
            .unwrap_or_else(|| Utc::now() + Duration::days(self.default_expiry_days));

        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications \
             (user_id, type, actor_id, actor_name, actor_picture, related_id, message, read, priority, metadata, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, $9, $10) \
             RETURNING *",
        )
        .bind(&new.user_id)
        .bind(&new.kind)
        .bind(&new.actor_id)
        .bind(&new.actor_name)
        .bind(&new.actor_picture)
        .bind(&new.related_id)
        .bind(&new.message)
        .bind(&new.priority)
        .bind(&new.metadata)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::db_err("Failed to create notification"))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT * FROM notifications WHERE id = $1 AND {ALIVE}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to load notification"))
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> AppResult<(Vec<Notification>, i64)> {
        let mut filter = format!("user_id = $1 AND {ALIVE}");
        if unread_only {
            filter.push_str(" AND read = FALSE");
        }

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM notifications WHERE {filter}"))
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Self::db_err("Failed to count notifications"))?;

        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT * FROM notifications WHERE {filter} \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_err("Failed to list notifications"))?;

        Ok((notifications, total))
    }

    async fn update(&self, notification: &Notification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications \
             SET message = $1, read = $2, metadata = $3, updated_at = NOW() \
             WHERE id = $4 \
             RETURNING *",
        )
        .bind(&notification.message)
        .bind(notification.read)
        .bind(&notification.metadata)
        .bind(notification.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to update notification"))?
        .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    async fn mark_read(&self, user_id: &str, id: Uuid) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications \
             SET read = TRUE, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND {ALIVE} \
             RETURNING *"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to mark notification read"))?
        .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET read = TRUE, updated_at = NOW() \
             WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Self::db_err("Failed to mark all notifications read"))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Self::db_err("Failed to delete notification"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification not found"));
        }
        Ok(())
    }

    async fn delete_all(&self, user_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Self::db_err("Failed to delete notifications"))?;
        Ok(result.rows_affected())
    }

    async fn count_unread(&self, user_id: &str) -> AppResult<i64> {
        sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM notifications \
             WHERE user_id = $1 AND read = FALSE AND {ALIVE}"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::db_err("Failed to count unread notifications"))
    }

    async fn statistics(&self, user_id: &str) -> AppResult<Vec<NotificationStatistics>> {
        sqlx::query_as::<_, NotificationStatistics>(&format!(
            "SELECT type, \
                    COUNT(*) AS count, \
                    COUNT(*) FILTER (WHERE read = FALSE) AS unread \
             FROM notifications \
             WHERE user_id = $1 AND {ALIVE} \
             GROUP BY type"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_err("Failed to load notification statistics"))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(Self::db_err("Failed to purge expired notifications"))?;
        Ok(result.rows_affected())
    }
}
