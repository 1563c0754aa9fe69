//! Trending repository data structure.

use serde::{Deserialize, Serialize};

/// One repository entry scraped from the trending page.
///
/// Ephemeral: produced by the fetcher, formatted and dispatched in the
/// same run, never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendingItem {
    /// Unique "owner/name" identity
    pub full_name: String,

    /// Repository owner (first half of `full_name`)
    pub author: String,

    /// Repository name (second half of `full_name`)
    pub name: String,

    /// Absolute URL of the repository page
    pub url: String,

    /// Repository description (empty string if the page omits it)
    pub description: String,

    /// Primary language (empty string if the page omits it)
    pub language: String,

    /// Total star count at fetch time
    pub stars: u64,

    /// Stars gained within the configured window
    pub stars_today: u64,

    /// 1-based position in the fetched list
    pub rank: usize,
}
