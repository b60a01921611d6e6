//! Peer registry — the ordered list of currently connected peer devices.

use std::fmt;

use crate::error::ProtocolError;

/// Battery reading of a peer device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatteryLevel {
    /// No reading received since the peer connected.
    #[default]
    Unknown,
    Empty,
    Low,
    Medium,
    Full,
}

impl BatteryLevel {
    /// Levels addressable by a wire `battery_level_id`, in index order.
    pub const INDEXED: [BatteryLevel; 4] = [Self::Empty, Self::Low, Self::Medium, Self::Full];

    /// Parse a wire `battery_level_id`: exactly one of `"0"`..`"3"`.
    pub fn from_index(value: &str) -> Result<Self, ProtocolError> {
        let index = match value {
            "0" => 0,
            "1" => 1,
            "2" => 2,
            "3" => 3,
            _ => {
                return Err(ProtocolError::InvalidBatteryIndex {
                    value: value.to_string(),
                })
            }
        };
        Ok(Self::INDEXED[index])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Empty => "EMPTY",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::Full => "FULL",
        }
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected peer (controller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerDevice {
    pub peer_id: String,
    pub battery_level: BatteryLevel,
}

impl PeerDevice {
    pub fn new(peer_id: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            battery_level: BatteryLevel::Unknown,
        }
    }
}

/// Ordered registry of connected peers.
///
/// Insertion order is significant: battery readings carry no peer id and
/// always apply to the most recently appended entry. Peer ids are not
/// unique; connecting the same id twice yields two entries.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    peers: Vec<PeerDevice>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a peer with an unknown battery level. Returns the new size.
    pub fn connect(&mut self, peer_id: impl Into<String>) -> usize {
        self.peers.push(PeerDevice::new(peer_id));
        self.peers.len()
    }

    /// Remove every entry with `peer_id`. Returns how many were removed.
    pub fn disconnect(&mut self, peer_id: &str) -> usize {
        let before = self.peers.len();
        self.peers.retain(|p| p.peer_id != peer_id);
        before - self.peers.len()
    }

    /// Set the battery level of the most recently appended peer.
    /// Returns false when the registry is empty.
    pub fn set_latest_battery(&mut self, level: BatteryLevel) -> bool {
        match self.peers.last_mut() {
            Some(peer) => {
                peer.battery_level = level;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerDevice> {
        self.peers.iter()
    }

    /// `"<id> - <LEVEL>"` per peer in registry order, joined by `" / "`.
    pub fn roll_call(&self) -> String {
        self.peers
            .iter()
            .map(|p| format!("{} - {}", p.peer_id, p.battery_level))
            .collect::<Vec<_>>()
            .join(" / ")
    }
}
