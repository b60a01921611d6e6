//! padwatchd — dongle status daemon.
//!
//! The binary wires these together; they are exposed as a library so the
//! integration tests can run a listener in-process.

pub mod control;
pub mod listener;

pub use control::ControlEvent;
pub use listener::ConnectionListener;
