//! barfeed Hyprland client
//!
//! Streams compositor events, runs queries and forwards messages, printing
//! one line per result for a status bar to consume.

mod hypr_ipc;
mod output;

use std::future::Future;
use std::path::PathBuf;

use barfeed_config::{Config, DEFAULT_CONFIG_PATH};
use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tokio::io::AsyncWrite;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::hypr_ipc::{
    resolve_socket_path, EventDispatcher, EventReceiver, EventStream, HyprClient, HyprError,
    DEFAULT_CHANNEL_BUFFER,
};
use crate::output::OutboundWriter;

#[derive(Parser, Debug)]
#[command(name = "barfeed-hypr")]
#[command(about = "Hyprland event and query client for status bars")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every compositor event as a JSON line until Hyprland exits
    Events,

    /// Run a hyprctl query and print its JSON result
    Query {
        /// Query name, e.g. `monitors` or `activewindow`
        command: String,
    },

    /// Print a message as a single line
    Send {
        /// Message text; multiple words are joined with spaces
        #[arg(required = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Expand tilde in config path
    let config_path: PathBuf = shellexpand::tilde(&cli.config).into_owned().into();
    let config = barfeed_config::load_config(&config_path)?;

    // stdout belongs to the status bar, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.global.log_level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Events => cmd_events(&config).await,
        Commands::Query { command } => cmd_query(&config, &command).await,
        Commands::Send { message } => cmd_send(&message.join(" ")).await,
    }
}

async fn cmd_events(config: &Config) -> miette::Result<()> {
    let socket_path = resolve_socket_path(&config.hyprland).into_diagnostic()?;
    let stream = EventStream::connect(&socket_path).await.into_diagnostic()?;
    info!(path = %socket_path.display(), "Listening for Hyprland events");

    let (dispatcher, mut events) = EventDispatcher::new(DEFAULT_CHANNEL_BUFFER);
    let reader = dispatcher.spawn(stream);
    let mut out = OutboundWriter::stdout();

    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down...");
    };
    let forwarded = forward_events(&mut events, &mut out, ctrl_c).await;

    reader.close();
    forwarded.into_diagnostic()?;
    reader.join().await.into_diagnostic()
}

/// Print records until the channel closes or `shutdown` resolves
async fn forward_events<W, F>(
    events: &mut EventReceiver,
    out: &mut OutboundWriter<W>,
    shutdown: F,
) -> Result<(), HyprError>
where
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(()),
            record = events.recv() => match record {
                Some(record) => {
                    debug!(event = %record.name, "Hyprland event");
                    out.send_json(&record).await?;
                }
                None => return Ok(()),
            },
        }
    }
}

async fn cmd_query(config: &Config, command: &str) -> miette::Result<()> {
    let client = HyprClient::from_config(&config.hyprland);
    let result = client.query(command).await.into_diagnostic()?;

    OutboundWriter::stdout().send(result).await.into_diagnostic()
}

async fn cmd_send(message: &str) -> miette::Result<()> {
    OutboundWriter::stdout().send(message).await.into_diagnostic()
}
