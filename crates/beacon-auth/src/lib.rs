//! # beacon-auth
//!
//! JWT verification for the REST surface and the WebSocket upgrade.
//! Token issuance belongs to the upstream identity service; this crate
//! only validates and extracts claims.

pub mod claims;
pub mod decoder;

pub use claims::Claims;
pub use decoder::JwtDecoder;
