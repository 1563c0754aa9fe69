// src/services/dispatcher.rs

//! Message delivery service.
//!
//! Owns the connection lifecycle to the messaging backend
//! (`Disconnected → Connecting → Open → Disconnected`), resolves the
//! destination and delivers a batch of messages with inter-message
//! pacing. One failed message never aborts the rest of the batch.

use std::sync::Arc;
use std::time::Duration;

use crate::config::MessagingConfig;
use crate::error::{AppError, Result};
use crate::messaging::{ChatBackend, ConnectionEvent, GroupInfo};
use crate::utils::log::Logger;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Open,
}

/// Outcome of sending one message of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    Sent,
    Failed { reason: String },
}

/// Per-item results of a batch delivery, in send order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<SendResult>,
}

impl BatchOutcome {
    /// Number of messages delivered.
    pub fn sent_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, SendResult::Sent))
            .count()
    }

    /// Number of messages that failed.
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.sent_count()
    }
}

/// Service driving a [`ChatBackend`] through one delivery session.
pub struct Dispatcher<B: ChatBackend> {
    backend: B,
    config: MessagingConfig,
    logger: Arc<Logger>,
    state: ConnState,
}

impl<B: ChatBackend> Dispatcher<B> {
    /// Create a dispatcher over the given backend.
    pub fn new(backend: B, config: &MessagingConfig, logger: Arc<Logger>) -> Self {
        Self {
            backend,
            config: config.clone(),
            logger,
            state: ConnState::Disconnected,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Establish the session and wait for it to open.
    ///
    /// Performs a one-shot wait on the backend's connection-event channel
    /// under a timeout; the first terminal event decides and the channel
    /// is dropped on every exit path, so no listener outlives the
    /// connect phase.
    pub async fn connect(&mut self, timeout: Duration) -> Result<()> {
        self.logger.info("Connecting to messaging backend");
        self.state = ConnState::Connecting;

        let mut events = match self
            .backend
            .start_session(self.config.online_on_connect)
            .await
        {
            Ok(events) => events,
            Err(error) => {
                self.state = ConnState::Disconnected;
                return Err(error);
            }
        };

        let outcome = tokio::time::timeout(timeout, events.recv()).await;
        drop(events);

        match outcome {
            Ok(Some(ConnectionEvent::Open)) => {
                self.state = ConnState::Open;
                self.logger.info("Messaging session open");
                Ok(())
            }
            Ok(Some(ConnectionEvent::Closed { logged_out: true })) => {
                self.state = ConnState::Disconnected;
                Err(AppError::ReauthRequired)
            }
            Ok(Some(ConnectionEvent::Closed { logged_out: false })) | Ok(None) => {
                self.state = ConnState::Disconnected;
                Err(AppError::ConnectionClosed)
            }
            Err(_) => {
                self.state = ConnState::Disconnected;
                Err(AppError::ConnectTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    /// Enumerate the groups the account participates in.
    pub async fn list_groups(&self) -> Result<Vec<GroupInfo>> {
        self.require_open()?;
        self.backend.list_groups().await
    }

    /// Resolve the configured destination identifier.
    ///
    /// A configured group name must match a joined group's display name
    /// exactly; otherwise the direct contact is used.
    pub async fn resolve_destination(&self) -> Result<String> {
        self.require_open()?;

        let Some(group_name) = self.config.group_name.as_deref() else {
            return Ok(self.config.destination_contact.clone());
        };

        self.logger
            .info(&format!("Searching for group \"{group_name}\""));
        let groups = self.list_groups().await?;

        groups
            .into_iter()
            .find(|group| group.name == group_name)
            .map(|group| {
                self.logger
                    .info(&format!("Found group \"{group_name}\" ({})", group.id));
                group.id
            })
            .ok_or_else(|| AppError::GroupNotFound {
                name: group_name.to_string(),
            })
    }

    /// Send messages strictly in order with inter-message pacing.
    ///
    /// A failure on one message is logged, captured in the outcome and
    /// the batch continues; individual sends are not retried.
    pub async fn send_batch(&self, destination: &str, messages: &[String]) -> Result<BatchOutcome> {
        self.require_open()?;

        let delay = Duration::from_millis(self.config.inter_message_delay_ms);
        let mut outcome = BatchOutcome::default();

        for (index, message) in messages.iter().enumerate() {
            match self.backend.send_text(destination, message).await {
                Ok(()) => {
                    self.logger
                        .info(&format!("Sent message {}/{}", index + 1, messages.len()));
                    outcome.results.push(SendResult::Sent);
                }
                Err(error) => {
                    self.logger.warn(&format!(
                        "Failed to send message {}/{}, continuing: {error}",
                        index + 1,
                        messages.len()
                    ));
                    outcome.results.push(SendResult::Failed {
                        reason: error.to_string(),
                    });
                }
            }

            let is_last = index + 1 == messages.len();
            if !is_last && delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(outcome)
    }

    /// End the session, keeping stored credentials valid.
    ///
    /// Idempotent; teardown errors are logged and swallowed.
    pub async fn disconnect(&mut self) {
        if self.state == ConnState::Disconnected {
            return;
        }
        if let Err(error) = self.backend.end_session().await {
            self.logger
                .warn(&format!("Error during disconnect, ignoring: {error}"));
        } else {
            self.logger.info("Disconnected from messaging backend");
        }
        self.state = ConnState::Disconnected;
    }

    fn require_open(&self) -> Result<()> {
        if self.state == ConnState::Open {
            Ok(())
        } else {
            Err(AppError::backend("messaging session is not open"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::GroupInfo;
    use crate::utils::log::LogLevel;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Scripted backend for dispatcher tests.
    struct ScriptedBackend {
        connect_event: Option<ConnectionEvent>,
        groups: Vec<GroupInfo>,
        // Message indexes (0-based) that fail to send
        failing: Vec<usize>,
        sent: Mutex<Vec<String>>,
        ended: Mutex<bool>,
    }

    impl ScriptedBackend {
        fn opening() -> Self {
            Self {
                connect_event: Some(ConnectionEvent::Open),
                groups: Vec::new(),
                failing: Vec::new(),
                sent: Mutex::new(Vec::new()),
                ended: Mutex::new(false),
            }
        }

        fn closing(logged_out: bool) -> Self {
            Self {
                connect_event: Some(ConnectionEvent::Closed { logged_out }),
                ..Self::opening()
            }
        }

        fn silent() -> Self {
            Self {
                connect_event: None,
                ..Self::opening()
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn start_session(
            &mut self,
            _mark_online: bool,
        ) -> crate::error::Result<mpsc::Receiver<ConnectionEvent>> {
            let (tx, rx) = mpsc::channel(1);
            if let Some(event) = self.connect_event {
                tx.send(event).await.ok();
            } else {
                // Keep the sender alive so recv() blocks until the timeout.
                tokio::spawn(async move {
                    let _tx = tx;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                });
            }
            Ok(rx)
        }

        async fn list_groups(&self) -> crate::error::Result<Vec<GroupInfo>> {
            Ok(self.groups.clone())
        }

        async fn send_text(&self, _destination: &str, body: &str) -> crate::error::Result<()> {
            let index = self.sent.lock().unwrap().len();
            self.sent.lock().unwrap().push(body.to_string());
            if self.failing.contains(&index) {
                Err(AppError::backend("scripted failure"))
            } else {
                Ok(())
            }
        }

        async fn end_session(&mut self) -> crate::error::Result<()> {
            *self.ended.lock().unwrap() = true;
            Ok(())
        }
    }

    fn make_dispatcher(backend: ScriptedBackend) -> Dispatcher<ScriptedBackend> {
        let mut config = MessagingConfig::default();
        config.destination_contact = "15551234567".to_string();
        config.inter_message_delay_ms = 0;
        Dispatcher::new(
            backend,
            &config,
            Arc::new(Logger::new(LogLevel::Error).quiet()),
        )
    }

    #[tokio::test]
    async fn connect_reaches_open_state() {
        let mut dispatcher = make_dispatcher(ScriptedBackend::opening());
        dispatcher.connect(Duration::from_secs(1)).await.unwrap();
        assert_eq!(dispatcher.state(), ConnState::Open);
    }

    #[tokio::test]
    async fn connect_logged_out_requires_reauth() {
        let mut dispatcher = make_dispatcher(ScriptedBackend::closing(true));
        let error = dispatcher.connect(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(error, AppError::ReauthRequired));
        assert_eq!(dispatcher.state(), ConnState::Disconnected);
    }

    #[tokio::test]
    async fn connect_close_maps_to_connection_closed() {
        let mut dispatcher = make_dispatcher(ScriptedBackend::closing(false));
        let error = dispatcher.connect(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(error, AppError::ConnectionClosed));
    }

    #[tokio::test]
    async fn connect_times_out_without_terminal_event() {
        let mut dispatcher = make_dispatcher(ScriptedBackend::silent());
        let error = dispatcher
            .connect(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::ConnectTimeout { .. }));
        assert_eq!(dispatcher.state(), ConnState::Disconnected);
    }

    #[tokio::test]
    async fn resolve_uses_direct_contact_without_group() {
        let mut dispatcher = make_dispatcher(ScriptedBackend::opening());
        dispatcher.connect(Duration::from_secs(1)).await.unwrap();

        let destination = dispatcher.resolve_destination().await.unwrap();
        assert_eq!(destination, "15551234567");
    }

    #[tokio::test]
    async fn resolve_matches_group_name_exactly() {
        let mut backend = ScriptedBackend::opening();
        backend.groups = vec![
            GroupInfo {
                id: "g-1".to_string(),
                name: "Repo Alerts Extra".to_string(),
                member_count: 4,
            },
            GroupInfo {
                id: "g-2".to_string(),
                name: "Repo Alerts".to_string(),
                member_count: 2,
            },
        ];

        let mut dispatcher = make_dispatcher(backend);
        dispatcher.config.group_name = Some("Repo Alerts".to_string());
        dispatcher.connect(Duration::from_secs(1)).await.unwrap();

        assert_eq!(dispatcher.resolve_destination().await.unwrap(), "g-2");
    }

    #[tokio::test]
    async fn resolve_unknown_group_fails() {
        let mut dispatcher = make_dispatcher(ScriptedBackend::opening());
        dispatcher.config.group_name = Some("Nope".to_string());
        dispatcher.connect(Duration::from_secs(1)).await.unwrap();

        let error = dispatcher.resolve_destination().await.unwrap_err();
        assert!(matches!(error, AppError::GroupNotFound { .. }));
    }

    #[tokio::test]
    async fn send_batch_continues_past_failures() {
        let mut backend = ScriptedBackend::opening();
        backend.failing = vec![1];

        let mut dispatcher = make_dispatcher(backend);
        dispatcher.connect(Duration::from_secs(1)).await.unwrap();

        let messages = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let outcome = dispatcher.send_batch("dest", &messages).await.unwrap();

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.sent_count(), 2);
        assert_eq!(outcome.failed_count(), 1);
        assert!(matches!(outcome.results[1], SendResult::Failed { .. }));

        // Every message was attempted, in order.
        let sent = dispatcher.backend.sent.lock().unwrap().clone();
        assert_eq!(sent, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn send_batch_requires_open_session() {
        let dispatcher = make_dispatcher(ScriptedBackend::opening());
        let error = dispatcher
            .send_batch("dest", &["msg".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Backend(_)));
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let mut dispatcher = make_dispatcher(ScriptedBackend::opening());
        dispatcher.connect(Duration::from_secs(1)).await.unwrap();

        dispatcher.disconnect().await;
        assert_eq!(dispatcher.state(), ConnState::Disconnected);
        assert!(*dispatcher.backend.ended.lock().unwrap());

        // Second disconnect is a no-op.
        dispatcher.disconnect().await;
        assert_eq!(dispatcher.state(), ConnState::Disconnected);
    }
}
