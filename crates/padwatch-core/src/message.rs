//! Message decoding.
//!
//! Wire grammar: `TAG|field1[|field2...]`, ASCII, no terminator, no length
//! prefix. Each socket read is assumed to hold exactly one message.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ProtocolError;
use crate::schema::MessageKind;

/// Field separator on the wire.
pub const SEPARATOR: char = '|';

/// A message split into tokens and checked against the schema.
///
/// Holds exactly `kind.field_count() + 1` tokens; token 0 is the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    kind: MessageKind,
    tokens: Vec<String>,
}

impl RawMessage {
    /// Decode one message from a raw chunk.
    ///
    /// Trailing CR/LF bytes are dropped so line-oriented senders work.
    /// Tokens past the schema's field count are ignored.
    pub fn decode(chunk: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(chunk).map_err(|_| ProtocolError::NotUtf8)?;
        let text = text.trim_end_matches(['\r', '\n']);

        let mut parts = text.split(SEPARATOR);
        let tag = parts.next().unwrap_or_default();
        let kind = MessageKind::from_tag(tag).ok_or_else(|| ProtocolError::UnknownMessageType {
            tag: tag.to_string(),
        })?;

        let expected = kind.field_count();
        let tokens: Vec<String> = std::iter::once(tag)
            .chain(parts.take(expected))
            .map(str::to_string)
            .collect();

        let got = tokens.len() - 1;
        if got < expected {
            return Err(ProtocolError::MalformedMessage {
                tag: kind.tag(),
                expected,
                got,
            });
        }

        Ok(Self { kind, tokens })
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// All tokens, tag first.
    pub fn fields(&self) -> &[String] {
        &self.tokens
    }

    /// Value of a named schema field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.kind
            .token_index(name)
            .and_then(|i| self.tokens.get(i))
            .map(String::as_str)
    }

    /// Field name → value for every schema field.
    pub fn decoded_fields(&self) -> BTreeMap<&'static str, &str> {
        self.kind
            .fields()
            .iter()
            .zip(self.tokens.iter().skip(1))
            .map(|(name, value)| (*name, value.as_str()))
            .collect()
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MSG:{}", self.kind.description())?;
        for (name, value) in self.kind.fields().iter().zip(self.tokens.iter().skip(1)) {
            write!(f, "\n\t{name}: [{value}]")?;
        }
        Ok(())
    }
}

/// A decoded message with a fixed shape per tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    DongleOn,
    PairingStart,
    PeerConnected { peer_id: String },
    PeerDisconnected { peer_id: String },
    /// `level_id` is left unparsed; it is validated when applied.
    BatteryLevel { level_id: String },
}

impl From<&RawMessage> for Event {
    fn from(raw: &RawMessage) -> Self {
        // RawMessage::decode guarantees every schema field is present.
        let field = |name: &str| raw.field(name).unwrap_or_default().to_string();
        match raw.kind() {
            MessageKind::DongleOn => Self::DongleOn,
            MessageKind::PairingStart => Self::PairingStart,
            MessageKind::PeerConnected => Self::PeerConnected {
                peer_id: field("controller_id"),
            },
            MessageKind::PeerDisconnected => Self::PeerDisconnected {
                peer_id: field("controller_id"),
            },
            MessageKind::BatteryLevel => Self::BatteryLevel {
                level_id: field("battery_level_id"),
            },
        }
    }
}
