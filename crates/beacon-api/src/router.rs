//! Route definitions for the Beacon HTTP API.

use axum::Router;
use axum::routing::{delete, get, patch};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ws", get(handlers::ws::ws_upgrade))
        .nest("/api", notification_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Notification and preferences endpoints (JWT required).
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/{id}/read",
            patch(handlers::notification::mark_read),
        )
        .route(
            "/notifications/read-all",
            patch(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete_notification),
        )
        .route(
            "/notifications/all",
            delete(handlers::notification::delete_all),
        )
        .route(
            "/notifications/statistics",
            get(handlers::notification::statistics),
        )
        .route(
            "/notifications/preferences",
            get(handlers::preferences::get_preferences)
                .patch(handlers::preferences::update_preferences),
        )
}
