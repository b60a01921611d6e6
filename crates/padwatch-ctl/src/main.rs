//! padwatch-ctl — stand-in for the dongle bridge, and a way to poke a
//! running daemon.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use padwatch_core::config::DEFAULT_PORT;
use padwatch_core::RawMessage;

/// The session a dongle produces when one controller pairs, reports its
/// battery, and leaves.
const DEMO_SESSION: &[&str] = &["DN|1", "PS|1", "CC|1", "BL|0|2", "CD|1"];

#[derive(Debug, Parser)]
#[command(name = "padwatch-ctl", version, about = "Talk to padwatchd")]
struct Cli {
    /// Daemon host.
    #[arg(long, default_value = "localhost", global = true)]
    host: String,

    /// Daemon port.
    #[arg(long, default_value_t = DEFAULT_PORT, global = true)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send raw wire messages, one write per message.
    Send {
        /// Pause after each message. Writes closer together may be
        /// coalesced into one read on the daemon side.
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,

        /// Messages such as `CC|7` or `BL|0|2`.
        #[arg(required = true)]
        messages: Vec<String>,

        /// Send even if a message does not decode locally.
        #[arg(long)]
        force: bool,
    },
    /// Replay a full pairing session: on, pairing, connect, battery, disconnect.
    Demo {
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
    /// Ask a running daemon to print battery status (SIGUSR1).
    Refresh {
        /// Process id of padwatchd.
        #[arg(long)]
        pid: i32,

        /// Send the reserved signal (SIGUSR2) instead.
        #[arg(long)]
        reserved: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Send {
            delay_ms,
            messages,
            force,
        } => {
            if !force {
                validate(&messages)?;
            }
            send_all(&cli.host, cli.port, &messages[..], delay_ms).await
        }
        Command::Demo { delay_ms } => send_all(&cli.host, cli.port, DEMO_SESSION, delay_ms).await,
        Command::Refresh { pid, reserved } => signal_daemon(pid, reserved),
    }
}

/// Check that every message decodes before anything goes on the wire.
fn validate<M: AsRef<str>>(messages: &[M]) -> Result<()> {
    for m in messages {
        let m = m.as_ref();
        RawMessage::decode(m.as_bytes())
            .with_context(|| format!("refusing to send {m:?} (use --force)"))?;
    }
    Ok(())
}

async fn send_all<M: AsRef<str>>(host: &str, port: u16, messages: &[M], delay_ms: u64) -> Result<()> {
    let mut stream = TcpStream::connect((host, port))
        .await
        .with_context(|| format!("failed to connect to padwatchd at {host}:{port}, is it running?"))?;
    tracing::info!(host, port, "connected");

    let delay = Duration::from_millis(delay_ms);
    for m in messages {
        let m = m.as_ref();
        stream
            .write_all(m.as_bytes())
            .await
            .with_context(|| format!("failed to send {m:?}"))?;
        tracing::info!(message = m, "sent");
        tokio::time::sleep(delay).await;
    }

    stream.shutdown().await.context("failed to close connection")?;
    Ok(())
}

#[cfg(unix)]
fn signal_daemon(pid: i32, reserved: bool) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let sig = if reserved { Signal::SIGUSR2 } else { Signal::SIGUSR1 };
    kill(Pid::from_raw(pid), sig).with_context(|| format!("failed to send {sig} to {pid}"))?;
    tracing::info!(pid, signal = %sig, "signal sent");
    Ok(())
}

#[cfg(not(unix))]
fn signal_daemon(_pid: i32, _reserved: bool) -> Result<()> {
    anyhow::bail!("refresh signals are only supported on Unix")
}
