// src/pipeline/notify.rs

//! The scheduled notification run.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::format::format_one;
use crate::messaging::{ChatBackend, GatewayBackend};
use crate::models::TrendingItem;
use crate::pipeline::ensure_credentials;
use crate::services::{Dispatcher, TrendingFetcher};
use crate::storage::SentLogStore;
use crate::utils::log::Logger;

/// Run the full notification flow: fetch, dedup, deliver, record.
pub async fn run_notify(config: &Config, logger: Arc<Logger>) -> Result<()> {
    logger.header("GitHub Trending Notifier");

    ensure_credentials(config)?;

    let fetcher = TrendingFetcher::new(&config.source, Arc::clone(&logger))?;
    let items = fetcher.fetch().await?;

    let backend = GatewayBackend::new(
        &config.messaging.gateway_url,
        &config.storage.credential_dir,
    )?;
    notify_items(config, logger, items, backend).await
}

/// Deliver notifications for the given items.
///
/// Split from [`run_notify`] so delivery semantics are testable with a
/// scripted backend and without a network fetch.
pub async fn notify_items<B: ChatBackend>(
    config: &Config,
    logger: Arc<Logger>,
    items: Vec<TrendingItem>,
    backend: B,
) -> Result<()> {
    let store = SentLogStore::new(&config.storage.log_file, Arc::clone(&logger));
    let log = store.load().await;
    let unsent = store.filter_unsent(&items, &log);

    if unsent.is_empty() {
        logger.info("No new trending repositories to notify");
        return Ok(());
    }
    logger.info(&format!(
        "Found {} new trending repositories to notify",
        unsent.len()
    ));

    let mut dispatcher = Dispatcher::new(backend, &config.messaging, Arc::clone(&logger));
    dispatcher
        .connect(Duration::from_secs(config.messaging.connect_timeout_secs))
        .await?;

    // The bridge session outlives this process, so once it is open the
    // delivery phase must not skip teardown on its way out.
    let delivery = async {
        let destination = dispatcher.resolve_destination().await?;

        // One notification per item, not one batched message.
        let messages: Vec<String> = unsent.iter().map(format_one).collect();
        let outcome = dispatcher.send_batch(&destination, &messages).await?;

        // The whole attempted batch is recorded, send failures included,
        // so a flaky message is not re-notified on the next run.
        store.record_sent(&unsent).await?;

        Ok::<_, crate::error::AppError>((destination, outcome))
    }
    .await;

    dispatcher.disconnect().await;
    let (destination, outcome) = delivery?;

    logger.summary(
        "Notification run complete",
        &[
            ("destination", destination),
            ("sent", outcome.sent_count().to_string()),
            ("failed", outcome.failed_count().to_string()),
        ],
    );
    Ok(())
}
