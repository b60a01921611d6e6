//! Status channel — the daemon's only user-visible output.

use std::fmt;
use std::io::Write;

/// One status emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Dongle powered on.
    On,
    /// Pairing started.
    Pairing,
    /// Number of connected peers.
    PeerCount(usize),
    /// Full battery roll-call, e.g. `"1 - LOW / 2 - FULL"`.
    RollCall(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Pairing => f.write_str("PAIRING"),
            Self::PeerCount(n) => write!(f, "{n}"),
            Self::RollCall(s) => f.write_str(s),
        }
    }
}

/// Receives status emissions from the dispatcher.
pub trait StatusSink {
    fn display(&mut self, status: &Status);
}

/// Writes one status line per emission to any `io::Write`.
pub struct WriterSink<W> {
    out: W,
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusSink for WriterSink<W> {
    fn display(&mut self, status: &Status) {
        if let Err(e) = writeln!(self.out, "{status}").and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write status line");
        }
    }
}

impl StatusSink for Vec<Status> {
    fn display(&mut self, status: &Status) {
        self.push(status.clone());
    }
}
