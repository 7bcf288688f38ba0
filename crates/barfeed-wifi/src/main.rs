//! barfeed wifi poller
//!
//! Prints a JSON snapshot of iwd's wireless devices once per interval.

mod iwd;
mod poller;

use std::path::PathBuf;

use anyhow::{Context, Result};
use barfeed_config::DEFAULT_CONFIG_PATH;
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::EnvFilter;

use crate::iwd::IwdClient;
use crate::poller::Poller;

#[derive(Parser, Debug)]
#[command(name = "barfeed-wifi")]
#[command(about = "Wireless state poller for status bars")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Print a single snapshot and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Expand tilde in config path
    let config_path: PathBuf = shellexpand::tilde(&args.config).into_owned().into();
    let config = barfeed_config::load_config(&config_path).with_context(|| {
        format!("Failed to load configuration from {}", config_path.display())
    })?;

    // stdout carries the snapshots, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.global.log_level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let backend = IwdClient::connect(&config.wifi.service)
        .await
        .context("Cannot reach iwd")?;

    let mut poller = Poller::new(backend, tokio::io::stdout(), &config.wifi);

    if args.once {
        return poller.emit_once().await;
    }

    poller.run(shutdown_signal()).await
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }

    tracing::info!("Shutting down...");
}
