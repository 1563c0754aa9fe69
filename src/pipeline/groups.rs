// src/pipeline/groups.rs

//! Group listing run.
//!
//! Connects, prints every group the account participates in and
//! disconnects. Used to find the exact display name to configure.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::messaging::{ChatBackend, GatewayBackend};
use crate::pipeline::ensure_credentials;
use crate::services::Dispatcher;
use crate::utils::log::Logger;

/// List the groups the messaging account participates in.
pub async fn run_list_groups(config: &Config, logger: Arc<Logger>) -> Result<()> {
    ensure_credentials(config)?;

    let backend = GatewayBackend::new(
        &config.messaging.gateway_url,
        &config.storage.credential_dir,
    )?;
    list_groups_with(config, logger, backend).await
}

pub(crate) async fn list_groups_with<B: ChatBackend>(
    config: &Config,
    logger: Arc<Logger>,
    backend: B,
) -> Result<()> {
    let mut dispatcher = Dispatcher::new(backend, &config.messaging, Arc::clone(&logger));
    dispatcher
        .connect(Duration::from_secs(config.messaging.connect_timeout_secs))
        .await?;

    let mut groups = dispatcher.list_groups().await?;
    groups.sort_by(|a, b| a.name.cmp(&b.name));

    if groups.is_empty() {
        logger.info("No groups found");
    } else {
        logger.info(&format!("Found {} group(s):", groups.len()));
        for group in &groups {
            logger.info(&format!(
                "  \"{}\" ({} members)",
                group.name, group.member_count
            ));
        }
        logger.info("Set messaging.group_name to one of these names to deliver there");
    }

    dispatcher.disconnect().await;
    Ok(())
}
