//! Cached request/response channel simulator library.
//!
//! This crate models, cycle by cycle, a cache sitting on a ready/valid channel
//! between an upstream requester and a downstream responder:
//! 1. **Channel:** Hit/miss routing, outstanding-request tracking, response buffering and retire/hit arbitration.
//! 2. **Units:** Set-associative cache with pluggable replacement, CAM tracker and bounded response FIFO.
//! 3. **Simulation:** Request source, response sink, fixed-latency memory and JSON loading.
//! 4. **Configuration:** Serializable, validated parameters with defaults for every field.

/// Shared types: payloads, handshake signals and errors.
pub mod common;
/// Channel configuration (defaults, policies, validation).
pub mod config;
/// The cached channel and its storage units.
pub mod core;
/// Simulation harness and file loading.
pub mod sim;
/// Channel statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The cached channel; construct with `CachedChannel::new`.
pub use crate::core::CachedChannel;
/// Cycle loop driving a channel against its peers.
pub use crate::sim::Simulator;
