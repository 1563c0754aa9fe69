// src/messaging/gateway.rs

//! HTTP bridge adapter.
//!
//! Talks to a locally-running WhatsApp bridge process over HTTP. The
//! bridge owns the actual protocol session and credential files; this
//! adapter only starts/stops the session, polls its state into a
//! connection-event channel, lists groups and posts text messages.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{AppError, Result};
use crate::messaging::{ChatBackend, ConnectionEvent, GroupInfo};
use crate::utils::http::create_gateway_client;

/// How often the session status is polled while connecting.
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Session status as reported by the bridge.
#[derive(Debug, Deserialize)]
struct SessionStatus {
    /// "connecting", "open" or "closed"
    status: String,
    #[serde(default)]
    logged_out: bool,
}

#[derive(Debug, Serialize)]
struct StartSessionRequest<'a> {
    auth_dir: &'a str,
    mark_online: bool,
}

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    to: &'a str,
    text: &'a str,
}

/// Messaging backend backed by a local HTTP bridge.
pub struct GatewayBackend {
    client: reqwest::Client,
    base_url: String,
    credential_dir: PathBuf,
    session_started: bool,
}

impl GatewayBackend {
    /// Create an adapter for the bridge at the given base URL.
    pub fn new(base_url: impl Into<String>, credential_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        // Reject malformed bridge URLs up front instead of on first use.
        url::Url::parse(&base_url)?;

        Ok(Self {
            client: create_gateway_client(30)?,
            base_url,
            credential_dir: credential_dir.into(),
            session_started: false,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_status(client: &reqwest::Client, url: &str) -> Result<SessionStatus> {
        let status = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<SessionStatus>()
            .await?;
        Ok(status)
    }
}

#[async_trait]
impl ChatBackend for GatewayBackend {
    async fn start_session(&mut self, mark_online: bool) -> Result<mpsc::Receiver<ConnectionEvent>> {
        let auth_dir = self.credential_dir.to_string_lossy();
        self.client
            .post(self.endpoint("session/start"))
            .json(&StartSessionRequest {
                auth_dir: auth_dir.as_ref(),
                mark_online,
            })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AppError::backend(format!("session start rejected: {e}")))?;
        self.session_started = true;

        // Poll session status until it turns terminal, forwarding exactly
        // one event. The task stops on its own once the receiver is
        // dropped or the event is delivered.
        let (tx, rx) = mpsc::channel(1);
        let client = self.client.clone();
        let status_url = self.endpoint("session/status");

        tokio::spawn(async move {
            loop {
                let event = match Self::fetch_status(&client, &status_url).await {
                    Ok(status) => match status.status.as_str() {
                        "open" => Some(ConnectionEvent::Open),
                        "closed" => Some(ConnectionEvent::Closed {
                            logged_out: status.logged_out,
                        }),
                        _ => None,
                    },
                    // Bridge unreachable counts as a close without logout.
                    Err(_) => Some(ConnectionEvent::Closed { logged_out: false }),
                };

                if let Some(event) = event {
                    let _ = tx.send(event).await;
                    return;
                }
                if tx.is_closed() {
                    return;
                }
                tokio::time::sleep(STATUS_POLL_INTERVAL).await;
            }
        });

        Ok(rx)
    }

    async fn list_groups(&self) -> Result<Vec<GroupInfo>> {
        let groups = self
            .client
            .get(self.endpoint("groups"))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AppError::backend(format!("group listing failed: {e}")))?
            .json::<Vec<GroupInfo>>()
            .await?;
        Ok(groups)
    }

    async fn send_text(&self, destination: &str, body: &str) -> Result<()> {
        self.client
            .post(self.endpoint("messages"))
            .json(&SendTextRequest {
                to: destination,
                text: body,
            })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AppError::backend(format!("send to {destination} failed: {e}")))?;
        Ok(())
    }

    async fn end_session(&mut self) -> Result<()> {
        if !self.session_started {
            return Ok(());
        }
        self.session_started = false;
        self.client
            .post(self.endpoint("session/stop"))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AppError::backend(format!("session stop failed: {e}")))?;
        Ok(())
    }
}
