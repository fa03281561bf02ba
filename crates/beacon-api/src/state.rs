//! Application state shared across all handlers.

use std::sync::Arc;

use beacon_auth::JwtDecoder;
use beacon_core::config::AppConfig;
use beacon_core::traits::store::{NotificationStore, PreferencesStore};
use beacon_realtime::SocketRegistry;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Notification store.
    pub store: Arc<dyn NotificationStore>,
    /// Preferences store.
    pub preferences: Arc<dyn PreferencesStore>,
    /// Socket registry for the WebSocket endpoint.
    pub registry: Arc<SocketRegistry>,
    /// JWT token decoder.
    pub jwt: Arc<JwtDecoder>,
}
