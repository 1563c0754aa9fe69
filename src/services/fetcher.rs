// src/services/fetcher.rs

//! Trending-page fetcher service.
//!
//! Retrieves the trending listing over HTTP with a bounded retry loop and
//! parses it into ranked items. Parsing is a pure function over the HTML
//! string so it can be exercised without a network.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::SourceConfig;
use crate::error::{AppError, Result};
use crate::models::TrendingItem;
use crate::utils::http::create_scrape_client;
use crate::utils::log::Logger;

/// Precompiled CSS selectors for the trending page layout.
struct Selectors {
    row: Selector,
    link: Selector,
    description: Selector,
    language: Selector,
    stars: Selector,
    stars_today: Selector,
}

impl Selectors {
    fn get() -> &'static Selectors {
        static SELECTORS: OnceLock<Selectors> = OnceLock::new();
        SELECTORS.get_or_init(|| {
            let sel = |s: &str| Selector::parse(s).expect("static selector");
            Selectors {
                row: sel("article.Box-row"),
                link: sel("h2 a"),
                description: sel("p"),
                language: sel(r#"[itemprop="programmingLanguage"]"#),
                stars: sel(r#"a[href*="/stargazers"]"#),
                stars_today: sel("span.d-inline-block.float-sm-right"),
            }
        })
    }
}

/// Service for fetching ranked trending repositories.
pub struct TrendingFetcher {
    config: SourceConfig,
    client: reqwest::Client,
    logger: Arc<Logger>,
}

impl TrendingFetcher {
    /// Create a new fetcher with the given source configuration.
    pub fn new(config: &SourceConfig, logger: Arc<Logger>) -> Result<Self> {
        let client = create_scrape_client(config)?;
        Ok(Self {
            config: config.clone(),
            client,
            logger,
        })
    }

    /// Fetch at most `result_limit` trending items, in page order.
    ///
    /// Retries transport failures with a fixed delay; once the configured
    /// attempts are exhausted the run fails with [`AppError::FetchExhausted`].
    pub async fn fetch(&self) -> Result<Vec<TrendingItem>> {
        let url = self.listing_url();
        let attempts = self.config.retry_attempts;
        let retry_delay = Duration::from_secs(self.config.retry_delay_secs);

        for attempt in 1..=attempts {
            self.logger.info(&format!(
                "Fetching trending repositories (attempt {attempt}/{attempts}): {url}"
            ));

            match self.fetch_once(&url).await {
                Ok(items) => {
                    self.logger
                        .info(&format!("Fetched {} trending repositories", items.len()));
                    return Ok(items);
                }
                Err(error) => {
                    self.logger
                        .warn(&format!("Fetch attempt {attempt} failed: {error}"));
                    if attempt < attempts {
                        tokio::time::sleep(retry_delay).await;
                    }
                }
            }
        }

        Err(AppError::FetchExhausted { attempts })
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<TrendingItem>> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_trending(&html, self.config.result_limit))
    }

    /// Listing URL with optional language and time-window qualifiers.
    fn listing_url(&self) -> String {
        let mut url = self.config.topic_url.trim_end_matches('/').to_string();
        if let Some(language) = &self.config.language_filter {
            url.push('/');
            url.push_str(language);
        }
        url.push_str("?since=");
        url.push_str(&self.config.window);
        url
    }
}

/// Parse the trending listing HTML into at most `limit` ranked items.
///
/// Best-effort per entry: a row without an identity link is skipped and
/// does not consume the limit; ranks stay contiguous over accepted rows.
pub fn parse_trending(html: &str, limit: usize) -> Vec<TrendingItem> {
    let selectors = Selectors::get();
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for row in document.select(&selectors.row) {
        if items.len() >= limit {
            break;
        }
        if let Some(item) = parse_row(&row, selectors, items.len() + 1) {
            items.push(item);
        }
    }

    items
}

fn parse_row(row: &ElementRef, selectors: &Selectors, rank: usize) -> Option<TrendingItem> {
    let href = row
        .select(&selectors.link)
        .next()
        .and_then(|e| e.value().attr("href"))?;

    let full_name = href.trim_start_matches('/').trim().to_string();
    let (author, name) = full_name.split_once('/')?;

    let description = row
        .select(&selectors.description)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let language = row
        .select(&selectors.language)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let stars = row
        .select(&selectors.stars)
        .next()
        .map(|e| parse_star_count(&e.text().collect::<String>()))
        .unwrap_or(0);

    let stars_today = row
        .select(&selectors.stars_today)
        .map(|e| e.text().collect::<String>())
        .find(|text| {
            text.contains("stars today")
                || text.contains("stars this week")
                || text.contains("stars this month")
        })
        .map(|text| parse_star_count(&text))
        .unwrap_or(0);

    Some(TrendingItem {
        author: author.to_string(),
        name: name.to_string(),
        url: format!("https://github.com/{full_name}"),
        full_name,
        description,
        language,
        stars,
        stars_today,
        rank,
    })
}

/// Extract a count from text such as "95,120" or "+143 stars today".
fn parse_star_count(text: &str) -> u64 {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"([\d,]+)").expect("static regex"));

    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}
