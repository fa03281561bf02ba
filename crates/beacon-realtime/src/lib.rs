//! # beacon-realtime
//!
//! Live WebSocket delivery for Beacon: the per-user connection registry,
//! single-writer connection handles, the ping/pong liveness probe, and
//! the shared presence view.
//!
//! The registry only reaches connections owned by this process;
//! cross-instance presence is answered from the shared cache.

pub mod connection;
pub mod frame;
pub mod heartbeat;
pub mod presence;
pub mod registry;

pub use connection::{ConnectionHandle, ConnectionId};
pub use frame::{Frame, Outbound};
pub use presence::PresenceTracker;
pub use registry::SocketRegistry;
