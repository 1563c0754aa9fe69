//! Persisted sent-log data structures.
//!
//! The on-disk JSON uses camelCase field names so log files written by
//! earlier versions of the notifier stay readable across upgrades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TrendingItem;

/// One previously-notified repository.
///
/// Identity is not unique: the same `full_name` may recur across days,
/// once per notification actually attempted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SentRecord {
    /// "owner/name" identity of the notified repository
    pub full_name: String,

    /// Total star count at send time
    pub stars: u64,

    /// Window star count at send time
    pub stars_today: u64,

    /// When the notification batch containing this item was attempted
    pub sent_at: DateTime<Utc>,

    /// List position at send time
    pub rank: usize,
}

impl SentRecord {
    /// Snapshot a trending item at the given send time.
    pub fn from_item(item: &TrendingItem, sent_at: DateTime<Utc>) -> Self {
        Self {
            full_name: item.full_name.clone(),
            stars: item.stars,
            stars_today: item.stars_today,
            sent_at,
            rank: item.rank,
        }
    }
}

/// The persisted aggregate: last check time plus sent records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationLog {
    /// When the notifier last completed a check
    pub last_check: DateTime<Utc>,

    /// Ordered sent records, oldest first
    pub sent_repositories: Vec<SentRecord>,
}

impl NotificationLog {
    /// Create an empty log stamped with the current time.
    pub fn fresh() -> Self {
        Self {
            last_check: Utc::now(),
            sent_repositories: Vec::new(),
        }
    }
}
