//! padwatchd — tracks controllers paired to a wireless dongle and prints
//! their status.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use padwatch_core::config::PadwatchConfig;
use padwatch_core::WriterSink;
use padwatchd::{control, ConnectionListener};

#[derive(Debug, Parser)]
#[command(name = "padwatchd", version, about = "Dongle status daemon")]
struct Cli {
    /// Log received bytes and registry state to stderr.
    #[arg(short, long)]
    debug: bool,

    /// Bind address (overrides config).
    #[arg(long, env = "PADWATCH_HOST")]
    host: Option<String>,

    /// Listen port (overrides config).
    #[arg(long, env = "PADWATCH_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_result = PadwatchConfig::load();
    let (mut config, override_warnings) = config_result
        .as_ref()
        .map(|(config, warnings)| (config.clone(), warnings.clone()))
        .unwrap_or_default();
    if cli.debug {
        config.logging.debug = true;
    }
    if let Some(host) = cli.host {
        config.network.host = host;
    }
    if let Some(port) = cli.port {
        config.network.port = port;
    }

    let default_filter = if config.logging.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = &config_result {
        tracing::warn!(error = %e, "failed to load config, using defaults");
    }
    for warning in &override_warnings {
        tracing::warn!("{warning}");
    }
    if let Err(e) = PadwatchConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }

    let addr: SocketAddr = config
        .network
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.network.bind_addr()))?;
    tracing::info!(%addr, debug = config.logging.debug, "padwatchd starting");

    let (control_tx, control_rx) = control::channel();
    let _signals = control::spawn_signal_forwarder(control_tx)?;

    let listener = ConnectionListener::bind(
        addr,
        config.network.read_buffer,
        WriterSink::stdout(),
        control_rx,
    )?;

    let dispatcher = listener.run().await;
    tracing::info!(peers = dispatcher.registry().len(), "padwatchd exiting");

    Ok(())
}
