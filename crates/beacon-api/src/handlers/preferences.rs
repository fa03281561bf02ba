//! Preferences REST handlers.

use axum::Json;
use axum::extract::State;

use beacon_core::error::AppError;
use beacon_entity::preferences::{PreferencesPatch, UserPreferences};

use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserPreferences>, AppError> {
    let preferences = state.preferences.get_or_create(&auth.user_id).await?;
    Ok(Json(preferences))
}

/// PATCH /api/notifications/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Json<UserPreferences>, AppError> {
    let preferences = state.preferences.update(&auth.user_id, patch).await?;
    Ok(Json(preferences))
}
