//! Common types shared by every component of the channel model.
//!
//! 1. **Payloads:** Request/response structures and their bit widths.
//! 2. **Handshake:** Per-tick ready/valid signals for the four ports.
//! 3. **Errors:** Configuration, protocol and simulation error types.

/// Request/response payloads and interface widths.
pub mod data;

/// Error types for configuration, protocol and simulation failures.
pub mod error;

/// Ready/valid port signals.
pub mod handshake;

pub use data::{InterfaceWidths, Request, Response};
pub use error::{ConfigError, ProtocolError, SimError};
pub use handshake::{ChannelInputs, ChannelOutputs, fires};
