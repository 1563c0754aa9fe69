// src/pipeline/mod.rs

//! Orchestrated runs.
//!
//! Each run is one linear flow wiring the fetcher, store and dispatcher
//! together. The scheduled entry point is [`run_notify`]; the remaining
//! runs are operator tools for checking the setup.

mod groups;
mod notify;
mod preview;
mod test_send;

pub use groups::run_list_groups;
pub use notify::{notify_items, run_notify};
pub use preview::run_scrape_preview;
pub use test_send::run_test_send;

use crate::config::Config;
use crate::error::{AppError, Result};

/// Fail fast when the messaging credential store is absent.
///
/// Checked before any network call so a missing setup never costs a
/// fetch or a connection attempt.
pub fn ensure_credentials(config: &Config) -> Result<()> {
    let dir = &config.storage.credential_dir;
    if dir.is_dir() {
        Ok(())
    } else {
        Err(AppError::config(format!(
            "Credential directory {:?} not found. Run the messaging setup first.",
            dir
        )))
    }
}
