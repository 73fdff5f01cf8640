//! Error Types.
//!
//! This module defines the error classes reported by the channel model:
//! 1. **Configuration errors:** Illegal parameters rejected at construction time.
//! 2. **Protocol violations:** Integrator errors detected while evaluating a tick.
//! 3. **Simulation errors:** Harness-level failures (I/O, parsing, timeouts).
//!
//! Capacity exhaustion (tracker full, buffer full, downstream not ready) is not
//! represented here; it is ordinary backpressure and only deasserts `ready`.

use std::path::PathBuf;

use thiserror::Error;

use super::data::InterfaceWidths;

/// Construction-time configuration failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A size parameter was zero.
    #[error("{what} must be non-zero")]
    Zero {
        /// Name of the offending parameter.
        what: &'static str,
    },

    /// A size parameter that must be a power of two was not.
    #[error("{what} must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending parameter.
        what: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// The cache associativity exceeds what the replacement state can encode.
    #[error("cache ways ({ways}) exceeds the supported maximum of {max}")]
    TooManyWays {
        /// Requested associativity.
        ways: usize,
        /// Largest supported associativity.
        max: usize,
    },

    /// A field width is outside `1..=64`.
    #[error("{what} width {value} is outside 1..=64")]
    WidthOutOfRange {
        /// Name of the offending field.
        what: &'static str,
        /// The rejected width.
        value: u32,
    },

    /// The tracker holds more entries than there are distinct request ids.
    #[error("tracker capacity {cam_ways} exceeds the {id_width}-bit id space")]
    TrackerExceedsIdSpace {
        /// Configured tracker capacity.
        cam_ways: usize,
        /// Configured id width.
        id_width: u32,
    },

    /// Two connected interfaces disagree on their field widths.
    #[error("interface width mismatch: upstream {upstream:?}, downstream {downstream:?}")]
    WidthMismatch {
        /// Widths configured on the channel.
        upstream: InterfaceWidths,
        /// Widths presented by the downstream peer.
        downstream: InterfaceWidths,
    },
}

/// Integrator errors detected while evaluating a tick.
///
/// A tick that detects one of these commits no state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A downstream response carried an id with no outstanding request.
    #[error("downstream response id {0:#x} matches no outstanding request")]
    UnknownResponseId(u64),

    /// An upstream request reused the id of a request still awaiting its response.
    #[error("request id {0:#x} collides with an outstanding request")]
    DuplicateRequestId(u64),

    /// A payload field does not fit its configured width.
    #[error("{field} value {value:#x} does not fit in {width} bits")]
    FieldOverflow {
        /// Name of the overflowing field.
        field: &'static str,
        /// The offending value.
        value: u64,
        /// Configured width of the field.
        width: u32,
    },

    /// A single-ported structure was driven twice in one tick.
    #[error("{0} port already driven this tick")]
    PortBusy(&'static str),
}

/// Failures of the simulation harness and its loaders.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Protocol violation raised by the channel.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A configuration or trace file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration or trace file could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The cycle budget ran out with responses still owed.
    #[error("simulation stopped after {cycles} cycles with {outstanding} responses outstanding")]
    Timeout {
        /// Cycles simulated.
        cycles: u64,
        /// Requests still waiting for a response (accepted or not yet issued).
        outstanding: usize,
    },
}
