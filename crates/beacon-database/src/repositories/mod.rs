//! Concrete store implementations backed by PostgreSQL.

pub mod notification;
pub mod preferences;
