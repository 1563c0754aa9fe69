// src/format.rs

//! Message rendering.
//!
//! Pure functions from trending items to notification text. No I/O and
//! no failure modes; missing fields render as fixed placeholders.

use crate::models::TrendingItem;
use crate::utils::group_thousands;

/// Render one item as an individual notification message.
pub fn format_one(item: &TrendingItem) -> String {
    let language = if item.language.is_empty() {
        "Not specified"
    } else {
        &item.language
    };
    let description = if item.description.is_empty() {
        "No description available"
    } else {
        &item.description
    };

    format!(
        "🌟 NEW TRENDING REPO #{rank}\n\
         \n\
         📦 {full_name}\n\
         ⭐ {stars} stars (+{stars_today} today)\n\
         💻 Language: {language}\n\
         \n\
         📝 {description}\n\
         \n\
         🔗 {url}\n\
         \n\
         ---\n\
         Sent by GitHub Stars Bot",
        rank = item.rank,
        full_name = item.full_name,
        stars = group_thousands(item.stars),
        stars_today = group_thousands(item.stars_today),
        language = language,
        description = description,
        url = item.url,
    )
}

/// Render a condensed multi-item digest.
///
/// Not used on the primary delivery path; kept for batch-mode callers.
pub fn format_summary(items: &[TrendingItem]) -> String {
    let header = format!("🔥 {} NEW TRENDING REPOS TODAY!\n\n", items.len());
    let list = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                "{}. {} - ⭐ {} today",
                index + 1,
                item.full_name,
                group_thousands(item.stars_today)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    header + &list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> TrendingItem {
        TrendingItem {
            full_name: "rust-lang/rust".to_string(),
            author: "rust-lang".to_string(),
            name: "rust".to_string(),
            url: "https://github.com/rust-lang/rust".to_string(),
            description: "Empowering everyone to build reliable software.".to_string(),
            language: "Rust".to_string(),
            stars: 95120,
            stars_today: 143,
            rank: 2,
        }
    }

    #[test]
    fn test_format_one_contains_identity_and_url() {
        let message = format_one(&sample_item());
        assert!(message.contains("rust-lang/rust"));
        assert!(message.contains("https://github.com/rust-lang/rust"));
        assert!(message.contains("#2"));
        assert!(message.contains("95,120 stars (+143 today)"));
        assert!(message.contains("Language: Rust"));
    }

    #[test]
    fn test_format_one_is_deterministic() {
        let item = sample_item();
        assert_eq!(format_one(&item), format_one(&item));
    }

    #[test]
    fn test_format_one_placeholders() {
        let mut item = sample_item();
        item.language = String::new();
        item.description = String::new();

        let message = format_one(&item);
        assert!(message.contains("Language: Not specified"));
        assert!(message.contains("No description available"));
    }

    #[test]
    fn test_format_summary() {
        let mut second = sample_item();
        second.full_name = "tokio-rs/tokio".to_string();
        second.stars_today = 1200;

        let digest = format_summary(&[sample_item(), second]);
        assert!(digest.starts_with("🔥 2 NEW TRENDING REPOS TODAY!"));
        assert!(digest.contains("1. rust-lang/rust - ⭐ 143 today"));
        assert!(digest.contains("2. tokio-rs/tokio - ⭐ 1,200 today"));
    }
}
