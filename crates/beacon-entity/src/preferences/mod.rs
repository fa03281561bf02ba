//! User notification preference entities.

pub mod model;

pub use model::{PreferencesPatch, QuietHours, UserPreferences};
