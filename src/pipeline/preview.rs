// src/pipeline/preview.rs

//! Scrape preview run.
//!
//! Fetches the trending page and prints the parsed items without
//! connecting to the messaging backend or touching the sent-log.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::format::format_one;
use crate::services::TrendingFetcher;
use crate::utils::group_thousands;
use crate::utils::log::Logger;

/// Fetch and print trending items without sending anything.
pub async fn run_scrape_preview(config: &Config, logger: Arc<Logger>) -> Result<()> {
    logger.header("Scrape preview");

    let fetcher = TrendingFetcher::new(&config.source, Arc::clone(&logger))?;
    let items = fetcher.fetch().await?;

    if items.is_empty() {
        logger.warn("Parsed 0 items; the page layout may have changed");
        return Ok(());
    }

    for item in &items {
        logger.info(&format!(
            "#{} {} - ⭐ {} (+{} today) [{}]",
            item.rank,
            item.full_name,
            group_thousands(item.stars),
            group_thousands(item.stars_today),
            if item.language.is_empty() {
                "unknown"
            } else {
                &item.language
            },
        ));
    }

    // Show what one delivered notification would look like.
    logger.info("First item rendered as a notification:");
    for line in format_one(&items[0]).lines() {
        logger.info(&format!("    {line}"));
    }

    Ok(())
}
