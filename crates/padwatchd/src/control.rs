//! Out-of-band control events.
//!
//! OS signals are turned into [`ControlEvent`]s and queued on a channel that
//! the connection listener drains between reads. Registry access therefore
//! never leaves the listener task.

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Re-emit current battery status (SIGUSR1).
    Refresh,
    /// Reserved channel (SIGUSR2). Logged, otherwise ignored.
    Reserved,
    /// Operator-requested shutdown (SIGINT / SIGTERM).
    Shutdown,
}

pub type ControlSender = mpsc::UnboundedSender<ControlEvent>;
pub type ControlReceiver = mpsc::UnboundedReceiver<ControlEvent>;

pub fn channel() -> (ControlSender, ControlReceiver) {
    mpsc::unbounded_channel()
}

/// Install signal handlers and forward them as control events.
///
/// Handlers are registered before this returns, so a signal sent right
/// after startup is not lost. The task ends after forwarding a shutdown or
/// when the receiver is dropped.
#[cfg(unix)]
pub fn spawn_signal_forwarder(tx: ControlSender) -> Result<JoinHandle<()>> {
    use anyhow::Context;
    use tokio::signal::unix::{signal, SignalKind};

    let mut usr1 = signal(SignalKind::user_defined1()).context("SIGUSR1 handler")?;
    let mut usr2 = signal(SignalKind::user_defined2()).context("SIGUSR2 handler")?;
    let mut term = signal(SignalKind::terminate()).context("SIGTERM handler")?;
    let mut int = signal(SignalKind::interrupt()).context("SIGINT handler")?;

    Ok(tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = usr1.recv() => ControlEvent::Refresh,
                _ = usr2.recv() => ControlEvent::Reserved,
                _ = term.recv() => ControlEvent::Shutdown,
                _ = int.recv()  => ControlEvent::Shutdown,
            };
            tracing::debug!(?event, "signal received");
            if tx.send(event).is_err() || event == ControlEvent::Shutdown {
                return;
            }
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_signal_forwarder(tx: ControlSender) -> Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        tracing::info!("shutdown signal received");
        let _ = tx.send(ControlEvent::Shutdown);
    }))
}
