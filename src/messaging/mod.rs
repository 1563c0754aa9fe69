// src/messaging/mod.rs

//! Messaging backend abstraction.
//!
//! The notifier treats the chat service purely as a capability interface:
//! open a session from stored credentials, observe connection-state
//! events, enumerate joined groups, send text, end the session. The wire
//! protocol behind those operations lives in a concrete adapter.

pub mod gateway;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

// Re-export for convenience
pub use gateway::GatewayBackend;

/// Terminal connection-state notification from the backend.
///
/// Exactly one of these is expected per session-open attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The session is open and ready to send
    Open,
    /// The session closed before (or instead of) opening
    Closed {
        /// True when the account was logged out; stored credentials are
        /// no longer valid and interactive setup must be re-run.
        logged_out: bool,
    },
}

/// A group the account participates in.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GroupInfo {
    /// Backend identifier used as a send destination
    pub id: String,
    /// Human-visible group name
    pub name: String,
    /// Number of participants
    #[serde(default)]
    pub member_count: usize,
}

/// Capability interface over the chat service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Start a session from stored credentials.
    ///
    /// Returns a channel that delivers the terminal [`ConnectionEvent`]
    /// for this attempt. Callers wait on the first event and drop the
    /// receiver afterwards; the backend must not require further reads.
    async fn start_session(&mut self, mark_online: bool) -> Result<mpsc::Receiver<ConnectionEvent>>;

    /// Enumerate all groups the account participates in.
    async fn list_groups(&self) -> Result<Vec<GroupInfo>>;

    /// Send a text message to the given destination identifier.
    async fn send_text(&self, destination: &str, body: &str) -> Result<()>;

    /// End the session without invalidating stored credentials.
    async fn end_session(&mut self) -> Result<()>;
}
