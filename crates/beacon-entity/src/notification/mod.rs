//! Notification domain entities.

pub mod event;
pub mod kind;
pub mod model;
pub mod priority;

pub use event::NotificationEvent;
pub use kind::NotificationKind;
pub use model::{GROUP_COUNT_KEY, NewNotification, Notification, NotificationStatistics};
pub use priority::Priority;
