//! # beacon-entity
//!
//! Domain entity models for Beacon. Every struct in this crate represents
//! a database table row, a wire payload, or a domain value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! database entities additionally derive `sqlx::FromRow`.

pub mod notification;
pub mod preferences;
