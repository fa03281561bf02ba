//! # beacon-database
//!
//! PostgreSQL connection management, the migration runner, and the
//! relational implementations of the notification and preferences
//! store contracts.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::notification::NotificationRepository;
pub use repositories::preferences::PreferencesRepository;
