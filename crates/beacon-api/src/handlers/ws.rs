//! WebSocket upgrade handler and per-connection socket tasks.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use beacon_core::error::AppError;
use beacon_realtime::connection::{ConnectionHandle, WRITE_TIMEOUT};
use beacon_realtime::frame::Outbound;
use beacon_realtime::heartbeat::Heartbeat;

use crate::dto::request::WsQuery;
use crate::state::AppState;

/// Buffered frames per connection before fan-out callers block.
const OUTBOUND_BUFFER: usize = 64;

/// GET /ws — WebSocket upgrade.
///
/// Auth runs before the upgrade: `?token=` first, then
/// `Authorization: Bearer`. An unauthenticated socket never reaches
/// the registry.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let token = query
        .token
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| AppError::unauthorized("Token required"))?;

    let claims = state.jwt.decode(&token)?;
    let user_id = claims.id;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, user_id, socket)))
}

/// Extract a bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(String::from)
}

/// Drives one established socket until it closes.
async fn handle_socket(state: AppState, user_id: String, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Outbound>(OUTBOUND_BUFFER);

    let handle = Arc::new(ConnectionHandle::new(&user_id, tx));
    let conn_id = handle.id;
    state.registry.register(Arc::clone(&handle)).await;

    // Single writer task: serializes every socket write and applies
    // the write deadline.
    let writer = {
        let registry = Arc::clone(&state.registry);
        let handle = Arc::clone(&handle);
        let user_id = user_id.clone();
        tokio::spawn(async move {
            while let Some(outbound) = rx.recv().await {
                let message = match outbound {
                    Outbound::Frame(text) => Message::Text(text.into()),
                    Outbound::Ping => Message::Ping(Vec::new().into()),
                };

                match timeout(WRITE_TIMEOUT, ws_tx.send(message)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!(conn_id = %handle.id, error = %e, "Socket write failed");
                        registry.unregister_conn(&user_id, handle.id).await;
                        break;
                    }
                    Err(_) => {
                        warn!(conn_id = %handle.id, "Socket write deadline exceeded");
                        registry.unregister_conn(&user_id, handle.id).await;
                        break;
                    }
                }
            }
        })
    };

    // Liveness probe: ping every 54 s, disconnect on a 60 s pong gap.
    let heartbeat = {
        let registry = Arc::clone(&state.registry);
        let handle = Arc::clone(&handle);
        tokio::spawn(async move { Heartbeat::new(registry).run(handle).await })
    };

    // Initial unread counter so clients render the badge immediately.
    match state.store.count_unread(&user_id).await {
        Ok(count) => state.registry.send_unread_count(&user_id, count).await,
        Err(e) => warn!(user_id = %user_id, error = %e, "Failed to load initial unread count"),
    }

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection established");

    // Reader: observes disconnect and refreshes the pong deadline.
    // Application-level client frames are logged and ignored.
    loop {
        tokio::select! {
            _ = handle.wait_closed() => break,
            incoming = ws_rx.next() => {
                let Some(result) = incoming else { break };
                match result {
                    Ok(Message::Pong(_)) => handle.touch_pong(),
                    Ok(Message::Close(_)) => break,
                    Ok(Message::Text(text)) => {
                        debug!(user_id = %user_id, message = %text.as_str(), "Ignoring client frame");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        }
    }

    state.registry.unregister_conn(&user_id, conn_id).await;
    heartbeat.abort();
    writer.abort();

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection closed");
}
