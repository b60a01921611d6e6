//! Event dispatch — applies decoded messages to the peer registry and
//! emits status lines.
//!
//! The dispatcher owns the registry and the display state. Everything that
//! reads or mutates them, including the out-of-band refresh request, goes
//! through `&mut Dispatcher`, so no locking is needed.

use crate::error::ProtocolError;
use crate::message::{Event, RawMessage};
use crate::registry::{BatteryLevel, PeerRegistry};
use crate::status::{Status, StatusSink};

/// Kind of the most recent status emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayKind {
    /// Nothing emitted yet.
    #[default]
    None,
    Generic,
    /// Emitted by the battery / refresh path.
    BatteryCheck,
}

/// Decides the verbosity of the next refresh: a refresh right after another
/// battery-check emission degrades to a peer count.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayState {
    pub last_emitted_kind: DisplayKind,
}

pub struct Dispatcher<S> {
    registry: PeerRegistry,
    display: DisplayState,
    sink: S,
}

impl<S: StatusSink> Dispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            registry: PeerRegistry::new(),
            display: DisplayState::default(),
            sink,
        }
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn display_state(&self) -> DisplayState {
        self.display
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decode one chunk and dispatch it.
    ///
    /// Protocol errors are logged and the message is discarded; the caller
    /// keeps serving the connection. Returns whether the message was applied.
    pub fn process(&mut self, chunk: &[u8]) -> bool {
        match self.try_process(chunk) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    chunk = %String::from_utf8_lossy(chunk),
                    "discarding message"
                );
                false
            }
        }
    }

    fn try_process(&mut self, chunk: &[u8]) -> Result<(), ProtocolError> {
        let raw = RawMessage::decode(chunk)?;
        tracing::debug!(tag = raw.kind().tag(), "{raw}");
        self.dispatch(Event::from(&raw))
    }

    /// Apply one event to the registry and emit its status line.
    pub fn dispatch(&mut self, event: Event) -> Result<(), ProtocolError> {
        match event {
            Event::DongleOn => {
                tracing::debug!("dongle initialized");
                self.emit(Status::On);
            }
            Event::PairingStart => {
                tracing::debug!("pairing started");
                self.emit(Status::Pairing);
            }
            Event::PeerConnected { peer_id } => {
                let count = self.registry.connect(peer_id);
                tracing::debug!(registry = ?self.registry, "peer connected");
                self.emit(Status::PeerCount(count));
            }
            Event::PeerDisconnected { peer_id } => {
                let removed = self.registry.disconnect(&peer_id);
                tracing::debug!(peer_id = %peer_id, removed, registry = ?self.registry, "peer disconnected");
                self.emit(Status::PeerCount(self.registry.len()));
            }
            Event::BatteryLevel { level_id } => {
                if self.registry.is_empty() {
                    tracing::debug!("battery reading with no connected peer, ignoring");
                    return Ok(());
                }
                let level = BatteryLevel::from_index(&level_id)?;
                self.registry.set_latest_battery(level);
                tracing::debug!(%level, registry = ?self.registry, "battery level updated");
                self.refresh();
            }
        }
        Ok(())
    }

    /// Re-emit registry state: the full roll-call, or just the peer count
    /// when the previous emission was already a battery check. Emits nothing
    /// while the registry is empty.
    pub fn refresh(&mut self) {
        if self.registry.is_empty() {
            tracing::debug!("refresh requested with no connected peer");
            return;
        }
        let status = if self.display.last_emitted_kind == DisplayKind::BatteryCheck {
            Status::PeerCount(self.registry.len())
        } else {
            Status::RollCall(self.registry.roll_call())
        };
        self.sink.display(&status);
        self.display.last_emitted_kind = DisplayKind::BatteryCheck;
    }

    fn emit(&mut self, status: Status) {
        self.sink.display(&status);
        self.display.last_emitted_kind = DisplayKind::Generic;
    }
}
