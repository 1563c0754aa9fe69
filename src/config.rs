// src/config.rs

//! Application configuration structures.
//!
//! Loaded once at process start from a TOML file and passed by reference
//! into each component. There is no ambient configuration lookup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Messaging backend and delivery settings
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Trending-page source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// File locations for the sent-log, credentials and log output
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            AppError::config(format!(
                "Failed to read config from {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.messaging.destination_contact.trim().is_empty()
            && self.messaging.group_name.is_none()
        {
            return Err(AppError::config(
                "messaging.destination_contact or messaging.group_name must be set",
            ));
        }
        if self.messaging.gateway_url.trim().is_empty() {
            return Err(AppError::config("messaging.gateway_url is empty"));
        }
        if self.messaging.connect_timeout_secs == 0 {
            return Err(AppError::config(
                "messaging.connect_timeout_secs must be > 0",
            ));
        }
        if self.source.topic_url.trim().is_empty() {
            return Err(AppError::config("source.topic_url is empty"));
        }
        if self.source.result_limit == 0 {
            return Err(AppError::config("source.result_limit must be > 0"));
        }
        if self.source.retry_attempts == 0 {
            return Err(AppError::config("source.retry_attempts must be > 0"));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::config("source.user_agent is empty"));
        }
        Ok(())
    }
}

/// Messaging backend and delivery behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Direct-contact identifier used when no group is configured
    #[serde(default)]
    pub destination_contact: String,

    /// Display name of a joined group to deliver to instead of the contact
    #[serde(default)]
    pub group_name: Option<String>,

    /// Whether the session should mark the account online on connect
    #[serde(default)]
    pub online_on_connect: bool,

    /// Delay between consecutive messages in milliseconds
    #[serde(default = "defaults::inter_message_delay")]
    pub inter_message_delay_ms: u64,

    /// Base URL of the local messaging bridge
    #[serde(default = "defaults::gateway_url")]
    pub gateway_url: String,

    /// Session-open timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            destination_contact: String::new(),
            group_name: None,
            online_on_connect: false,
            inter_message_delay_ms: defaults::inter_message_delay(),
            gateway_url: defaults::gateway_url(),
            connect_timeout_secs: defaults::connect_timeout(),
        }
    }
}

/// Trending-page source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the trending listing page
    #[serde(default = "defaults::topic_url")]
    pub topic_url: String,

    /// Maximum number of items taken from the page, in page order
    #[serde(default = "defaults::result_limit")]
    pub result_limit: usize,

    /// Optional language path qualifier (e.g. "rust")
    #[serde(default)]
    pub language_filter: Option<String>,

    /// Time-window qualifier: "daily", "weekly" or "monthly"
    #[serde(default = "defaults::window")]
    pub window: String,

    /// User-Agent header for page requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Total fetch attempts before giving up
    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between fetch attempts in seconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            topic_url: defaults::topic_url(),
            result_limit: defaults::result_limit(),
            language_filter: None,
            window: defaults::window(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retry_attempts: defaults::retry_attempts(),
            retry_delay_secs: defaults::retry_delay(),
        }
    }
}

/// File locations used by the notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the persisted sent-log JSON file
    #[serde(default = "defaults::log_file")]
    pub log_file: PathBuf,

    /// Directory holding the messaging session credentials
    #[serde(default = "defaults::credential_dir")]
    pub credential_dir: PathBuf,

    /// Optional file the logger tees its output into
    #[serde(default)]
    pub log_output_file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_file: defaults::log_file(),
            credential_dir: defaults::credential_dir(),
            log_output_file: None,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Messaging defaults
    pub fn inter_message_delay() -> u64 {
        2000
    }
    pub fn gateway_url() -> String {
        "http://127.0.0.1:3000".into()
    }
    pub fn connect_timeout() -> u64 {
        30
    }

    // Source defaults
    pub fn topic_url() -> String {
        "https://github.com/trending".into()
    }
    pub fn result_limit() -> usize {
        10
    }
    pub fn window() -> String {
        "daily".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn retry_attempts() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        2
    }

    // Storage defaults
    pub fn log_file() -> PathBuf {
        PathBuf::from("data/sent-repos.json")
    }
    pub fn credential_dir() -> PathBuf {
        PathBuf::from("auth")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_missing_destination() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_contact_only() {
        let mut config = Config::default();
        config.messaging.destination_contact = "15551234567".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_accepts_group_only() {
        let mut config = Config::default();
        config.messaging.group_name = Some("Repo Alerts".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_result_limit() {
        let mut config = Config::default();
        config.messaging.destination_contact = "15551234567".to_string();
        config.source.result_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [messaging]
            destination_contact = "15551234567"
            group_name = "Repo Alerts"

            [source]
            language_filter = "rust"
            window = "weekly"

            [storage]
            log_file = "data/sent.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.messaging.group_name.as_deref(), Some("Repo Alerts"));
        assert_eq!(config.source.language_filter.as_deref(), Some("rust"));
        assert_eq!(config.source.result_limit, 10);
        assert_eq!(config.messaging.inter_message_delay_ms, 2000);
        assert_eq!(config.storage.log_file, PathBuf::from("data/sent.json"));
    }
}
