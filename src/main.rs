// src/main.rs

//! starnotify CLI
//!
//! Scheduled entry point for the trending-repository notifier. The `run`
//! command is what a cron job invokes; the other commands are operator
//! tools for checking the scrape and delivery setup.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use starnotify::{
    config::Config,
    error::Result,
    pipeline::{run_list_groups, run_notify, run_scrape_preview, run_test_send},
    utils::log::{LogLevel, Logger},
};

/// starnotify - GitHub Trending Notifier
#[derive(Parser, Debug)]
#[command(
    name = "starnotify",
    version,
    about = "Pushes GitHub trending repository alerts to a WhatsApp contact or group"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging (shorthand for --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Minimum log level: debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress console output (file logging still applies)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch trending repositories and deliver new ones
    Run,

    /// List the groups the messaging account participates in
    ListGroups,

    /// Fetch and print trending repositories without sending
    Scrape,

    /// Send a single test message to the configured destination
    TestSend {
        /// Message body (a canned test message when omitted)
        #[arg(long)]
        message: Option<String>,
    },
}

/// Main entry point
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("starnotify: {error}");
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::from_str(&cli.log_level)
    };
    let logger = match &config.storage.log_output_file {
        Some(path) => Logger::with_file(level, path),
        None => Logger::new(level),
    };
    let logger = Arc::new(if cli.quiet { logger.quiet() } else { logger });

    let result = dispatch(cli.command, &config, Arc::clone(&logger)).await;
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            logger.error(&format!("Fatal: {error}"));
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Command, config: &Config, logger: Arc<Logger>) -> Result<()> {
    match command {
        Command::Run => run_notify(config, logger).await,
        Command::ListGroups => run_list_groups(config, logger).await,
        Command::Scrape => run_scrape_preview(config, logger).await,
        Command::TestSend { message } => run_test_send(config, logger, message).await,
    }
}
