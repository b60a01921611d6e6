//! Message schema — maps each wire tag to its ordered field names.
//!
//! The table is a compile-time `match`; there is no runtime registration.

/// Every message type the dongle sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// DN — dongle powered on
    DongleOn,
    /// PS — pairing started
    PairingStart,
    /// CC — peer connected
    PeerConnected,
    /// CD — peer disconnected
    PeerDisconnected,
    /// BL — battery reading for the latest-connected peer
    BatteryLevel,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        Self::DongleOn,
        Self::PairingStart,
        Self::PeerConnected,
        Self::PeerDisconnected,
        Self::BatteryLevel,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "DN" => Some(Self::DongleOn),
            "PS" => Some(Self::PairingStart),
            "CC" => Some(Self::PeerConnected),
            "CD" => Some(Self::PeerDisconnected),
            "BL" => Some(Self::BatteryLevel),
            _ => None,
        }
    }

    /// Two-letter wire tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::DongleOn => "DN",
            Self::PairingStart => "PS",
            Self::PeerConnected => "CC",
            Self::PeerDisconnected => "CD",
            Self::BatteryLevel => "BL",
        }
    }

    /// Field names in wire order, excluding the tag itself.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::DongleOn | Self::PairingStart => &["dummy"],
            Self::PeerConnected | Self::PeerDisconnected => &["controller_id"],
            Self::BatteryLevel => &["dummy", "battery_level_id"],
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields().len()
    }

    /// Position of `name` in the wire tokens (the tag is token 0).
    pub fn token_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| *f == name).map(|i| i + 1)
    }

    /// Human-readable description, used in debug dumps.
    pub fn description(&self) -> &'static str {
        match self {
            Self::DongleOn => "dongle_initialized",
            Self::PairingStart => "pairing_started",
            Self::PeerConnected => "controller_connected",
            Self::PeerDisconnected => "controller_disconnected",
            Self::BatteryLevel => "battery_level",
        }
    }
}
