//! padwatch-core — wire schema, decoder, peer registry, and dispatcher.
//! No I/O lives here; the daemon feeds raw chunks in and receives status
//! lines through a [`StatusSink`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod registry;
pub mod schema;
pub mod status;

pub use dispatch::{DisplayKind, DisplayState, Dispatcher};
pub use error::ProtocolError;
pub use message::{Event, RawMessage};
pub use registry::{BatteryLevel, PeerDevice, PeerRegistry};
pub use schema::MessageKind;
pub use status::{Status, StatusSink, WriterSink};
