//! Simulation harness.
//!
//! Surrounds a [`CachedChannel`](crate::core::CachedChannel) with a request
//! source, a response sink and a downstream responder, and loads the JSON
//! configuration and trace files the CLI runs from.

/// Downstream responder trait and the fixed-latency memory model.
pub mod downstream;
/// Upstream request source and response sink.
pub mod driver;
/// JSON configuration and trace loading.
pub mod loader;
/// Cycle loop tying the channel to its peers.
pub mod simulator;

pub use self::downstream::{Downstream, LatencyMemory};
pub use self::driver::{RequestSource, ResponseSink};
pub use self::loader::{load_config, load_trace, parse_trace};
pub use self::simulator::Simulator;
