// src/models/mod.rs

//! Domain models for the notifier application.

mod sent;
mod trending;

// Re-export all public types
pub use sent::{NotificationLog, SentRecord};
pub use trending::TrendingItem;
