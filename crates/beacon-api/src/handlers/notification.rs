//! Notification REST handlers — thin layers over the store contract.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use beacon_core::error::AppError;
use beacon_entity::notification::Notification;

use crate::dto::request::ListNotificationsQuery;
use crate::dto::response::{CountResponse, MessageResponse, NotificationPage, StatisticsResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<NotificationPage>, AppError> {
    let (notifications, total) = state
        .store
        .find_by_user(&auth.user_id, query.limit(), query.offset(), query.unread_only)
        .await?;

    Ok(Json(NotificationPage::new(
        notifications,
        query.page(),
        query.limit(),
        total,
    )))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CountResponse>, AppError> {
    let count = state.store.count_unread(&auth.user_id).await?;
    Ok(Json(CountResponse { count }))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = state.store.mark_read(&auth.user_id, id).await?;
    Ok(Json(notification))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.mark_all_read(&auth.user_id).await?;
    Ok(Json(MessageResponse::new("All notifications marked as read")))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete(&auth.user_id, id).await?;
    Ok(Json(MessageResponse::new("Notification deleted")))
}

/// DELETE /api/notifications/all
pub async fn delete_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete_all(&auth.user_id).await?;
    Ok(Json(MessageResponse::new("All notifications deleted")))
}

/// GET /api/notifications/statistics
pub async fn statistics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<StatisticsResponse>, AppError> {
    let statistics = state.store.statistics(&auth.user_id).await?;
    Ok(Json(StatisticsResponse { statistics }))
}
