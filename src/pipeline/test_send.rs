// src/pipeline/test_send.rs

//! Delivery check run.
//!
//! Connects, resolves the configured destination and sends one test
//! message through the full delivery path.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::messaging::{ChatBackend, GatewayBackend};
use crate::pipeline::ensure_credentials;
use crate::services::Dispatcher;
use crate::utils::log::Logger;

/// Default body when the operator does not supply one.
const DEFAULT_TEST_MESSAGE: &str =
    "🔔 Test notification from GitHub Stars Bot. If you can read this, delivery works.";

/// Send a single test message to the configured destination.
pub async fn run_test_send(config: &Config, logger: Arc<Logger>, message: Option<String>) -> Result<()> {
    ensure_credentials(config)?;

    let backend = GatewayBackend::new(
        &config.messaging.gateway_url,
        &config.storage.credential_dir,
    )?;
    test_send_with(config, logger, message, backend).await
}

pub(crate) async fn test_send_with<B: ChatBackend>(
    config: &Config,
    logger: Arc<Logger>,
    message: Option<String>,
    backend: B,
) -> Result<()> {
    let body = message.unwrap_or_else(|| DEFAULT_TEST_MESSAGE.to_string());

    let mut dispatcher = Dispatcher::new(backend, &config.messaging, Arc::clone(&logger));
    dispatcher
        .connect(Duration::from_secs(config.messaging.connect_timeout_secs))
        .await?;

    // Tear the session down on every path once it is open; the bridge
    // keeps it alive across process exit otherwise.
    let delivery = async {
        let destination = dispatcher.resolve_destination().await?;
        let outcome = dispatcher.send_batch(&destination, &[body]).await?;
        Ok::<_, AppError>((destination, outcome))
    }
    .await;

    dispatcher.disconnect().await;
    let (destination, outcome) = delivery?;

    if outcome.failed_count() > 0 {
        return Err(AppError::backend("test message failed to send"));
    }
    logger.success(&format!("Test message delivered to {destination}"));
    Ok(())
}
