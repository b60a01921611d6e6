//! Protocol errors raised while decoding or applying a message.

/// A message that could not be decoded or applied.
///
/// None of these are fatal: the dispatcher logs them and discards the
/// offending message. The sender has no error-reply channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown message type {tag:?}")]
    UnknownMessageType { tag: String },

    #[error("malformed {tag} message: expected {expected} fields, got {got}")]
    MalformedMessage {
        tag: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid battery level index {value:?} (expected 0-3)")]
    InvalidBatteryIndex { value: String },

    #[error("message is not valid UTF-8")]
    NotUtf8,
}
