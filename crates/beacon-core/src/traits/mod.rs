//! Core traits defined in `beacon-core` and implemented by other crates.

pub mod cache;
pub mod store;

pub use cache::CacheProvider;
pub use store::{NotificationStore, PreferencesStore};
