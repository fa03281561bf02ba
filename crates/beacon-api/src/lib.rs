//! # beacon-api
//!
//! HTTP surface for Beacon built on Axum: the notification and
//! preferences REST endpoints, the WebSocket upgrade, extractors,
//! DTOs, and CORS wiring.
//!
//! Handlers are thin read/update layers over the store contracts; the
//! pipeline itself lives in `beacon-queue`.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
