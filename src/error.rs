// src/error.rs

//! Unified error handling for the notifier application.

use thiserror::Error;

/// Result type alias for notifier operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// All fetch attempts against the trending page failed
    #[error("Failed to fetch trending repositories after {attempts} attempts")]
    FetchExhausted { attempts: u32 },

    /// Writing the sent-log broke; the record of this run's notifications is at risk
    #[error("Failed to persist sent-log: {0}")]
    PersistFailed(String),

    /// Messaging session did not open within the allowed time
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectTimeout { timeout_ms: u64 },

    /// Messaging session closed before opening
    #[error("Connection closed before the session opened")]
    ConnectionClosed,

    /// Backend reports the account is logged out; interactive setup required
    #[error("Logged out of the messaging account, re-run setup to authenticate")]
    ReauthRequired,

    /// Configured group name does not match any joined group
    #[error("Group \"{name}\" not found. Create the group first, then retry.")]
    GroupNotFound { name: String },

    /// Messaging backend operation failed
    #[error("Backend error: {0}")]
    Backend(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a persistence error.
    pub fn persist(message: impl Into<String>) -> Self {
        Self::PersistFailed(message.into())
    }

    /// Create a messaging backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}
