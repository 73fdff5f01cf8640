//! Configuration system for the cached channel model.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the channel and its simulation harness. It provides:
//! 1. **Defaults:** Baseline sizes (cache geometry, tracker capacity, buffer depth).
//! 2. **Structures:** Hierarchical config for widths, cache, tracker and harness.
//! 3. **Validation:** Construction-time checks that reject illegal geometries.
//!
//! Configuration is supplied as JSON (see [`crate::sim::loader`]) or built with
//! `Config::default()`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::{ConfigError, InterfaceWidths};

/// Largest supported cache associativity; the PLRU tree for a set lives in one `u64`.
pub const MAX_CACHE_WAYS: usize = 64;

/// Default configuration constants.
mod defaults {
    /// Default cache associativity.
    pub const CACHE_WAYS: usize = 4;

    /// Default number of sets (lines per way).
    pub const CACHE_LINES: usize = 16;

    /// Default outstanding-request tracker capacity.
    pub const CAM_WAYS: usize = 8;

    /// Default response buffer depth (twice the tracker, so the tracker binds first).
    pub const RESPONSE_BUFFER_DEPTH: usize = 16;

    /// Default downstream memory latency in ticks.
    pub const MEMORY_LATENCY: u64 = 4;

    /// Default number of requests the downstream memory holds in flight.
    pub const MEMORY_QUEUE_DEPTH: usize = 8;

    /// Default upstream consumer readiness period (ready every tick).
    pub const SINK_READY_EVERY: u64 = 1;

    /// Default cycle budget for `Simulator::run`.
    pub const MAX_CYCLES: u64 = 100_000;
}

/// Rejects zero and non-power-of-two sizes.
pub(crate) const fn require_power_of_two(
    what: &'static str,
    value: usize,
) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { what })
    } else if !value.is_power_of_two() {
        Err(ConfigError::NotPowerOfTwo { what, value })
    } else {
        Ok(())
    }
}

/// Cache replacement policy algorithms.
///
/// Specifies the algorithm used to select which way to evict when a fill
/// targets a full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Tree-based pseudo-LRU.
    #[default]
    #[serde(alias = "Plru")]
    Plru,
    /// Exact least-recently-used ordering.
    #[serde(alias = "Lru")]
    Lru,
    /// Evicts in installation order; hits do not reorder.
    #[serde(alias = "Fifo")]
    Fifo,
    /// Pseudo-random (xorshift) selection.
    #[serde(alias = "Random")]
    Random,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use chansim_core::config::{Config, ReplacementPolicy};
///
/// let json = r#"{
///     "widths": { "id_width": 4, "addr_width": 16, "data_width": 32 },
///     "cache": { "ways": 2, "lines": 8, "policy": "Lru" },
///     "tracker": { "cam_ways": 4 },
///     "response_buffer_depth": 8
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.cache.policy, ReplacementPolicy::Lru);
/// assert_eq!(config.tracker.cam_ways, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Request/response field widths.
    #[serde(default)]
    pub widths: InterfaceWidths,
    /// Cache geometry and policy.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Outstanding-request tracker.
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Depth of the upstream response FIFO.
    #[serde(default = "Config::default_response_buffer_depth")]
    pub response_buffer_depth: usize,
    /// Simulation harness parameters.
    #[serde(default)]
    pub sim: SimConfig,
}

impl Config {
    fn default_response_buffer_depth() -> usize {
        defaults::RESPONSE_BUFFER_DEPTH
    }

    /// Checks every construction-time constraint.
    ///
    /// A response buffer shallower than twice the tracker is legal but logged,
    /// since the buffer then throttles misses before the tracker does.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (what, value) in [
            ("id", self.widths.id_width),
            ("addr", self.widths.addr_width),
            ("data", self.widths.data_width),
        ] {
            if value == 0 || value > u64::BITS {
                return Err(ConfigError::WidthOutOfRange { what, value });
            }
        }
        self.cache.validate()?;
        self.tracker.validate()?;
        if self.tracker.cam_ways as u64 > self.widths.id_space() {
            return Err(ConfigError::TrackerExceedsIdSpace {
                cam_ways: self.tracker.cam_ways,
                id_width: self.widths.id_width,
            });
        }
        if self.response_buffer_depth == 0 {
            return Err(ConfigError::Zero {
                what: "response_buffer_depth",
            });
        }
        if self.response_buffer_depth < 2 * self.tracker.cam_ways {
            warn!(
                depth = self.response_buffer_depth,
                cam_ways = self.tracker.cam_ways,
                "response buffer shallower than twice the tracker; the buffer will throttle misses"
            );
        }
        self.sim.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            widths: InterfaceWidths::default(),
            cache: CacheConfig::default(),
            tracker: TrackerConfig::default(),
            response_buffer_depth: defaults::RESPONSE_BUFFER_DEPTH,
            sim: SimConfig::default(),
        }
    }
}

/// Cache geometry and replacement policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Associativity (ways per set); a power of two.
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,
    /// Number of sets (lines per way); a power of two. One set is fully associative.
    #[serde(default = "CacheConfig::default_lines")]
    pub lines: usize,
    /// Built-in replacement policy.
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl CacheConfig {
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    fn default_lines() -> usize {
        defaults::CACHE_LINES
    }

    /// Rejects zero, non-power-of-two and oversized geometries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_power_of_two("cache.ways", self.ways)?;
        require_power_of_two("cache.lines", self.lines)?;
        if self.ways > MAX_CACHE_WAYS {
            return Err(ConfigError::TooManyWays {
                ways: self.ways,
                max: MAX_CACHE_WAYS,
            });
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ways: defaults::CACHE_WAYS,
            lines: defaults::CACHE_LINES,
            policy: ReplacementPolicy::default(),
        }
    }
}

/// Outstanding-request tracker (CAM) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Capacity in entries; a power of two.
    #[serde(default = "TrackerConfig::default_cam_ways")]
    pub cam_ways: usize,
}

impl TrackerConfig {
    fn default_cam_ways() -> usize {
        defaults::CAM_WAYS
    }

    /// Rejects zero and non-power-of-two capacities.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        require_power_of_two("tracker.cam_ways", self.cam_ways)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            cam_ways: defaults::CAM_WAYS,
        }
    }
}

/// Parameters of the simulation harness peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Ticks between a downstream request being accepted and its response becoming valid.
    #[serde(default = "SimConfig::default_latency")]
    pub latency: u64,
    /// Requests the downstream memory holds before deasserting `ready`.
    #[serde(default = "SimConfig::default_queue_depth")]
    pub queue_depth: usize,
    /// The upstream consumer asserts `ready` on every N-th tick.
    #[serde(default = "SimConfig::default_sink_ready_every")]
    pub sink_ready_every: u64,
    /// Cycle budget for a complete run.
    #[serde(default = "SimConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl SimConfig {
    fn default_latency() -> u64 {
        defaults::MEMORY_LATENCY
    }

    fn default_queue_depth() -> usize {
        defaults::MEMORY_QUEUE_DEPTH
    }

    fn default_sink_ready_every() -> u64 {
        defaults::SINK_READY_EVERY
    }

    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    /// Rejects a harness that could never make progress.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_depth == 0 {
            return Err(ConfigError::Zero {
                what: "sim.queue_depth",
            });
        }
        if self.sink_ready_every == 0 {
            return Err(ConfigError::Zero {
                what: "sim.sink_ready_every",
            });
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            latency: defaults::MEMORY_LATENCY,
            queue_depth: defaults::MEMORY_QUEUE_DEPTH,
            sink_ready_every: defaults::SINK_READY_EVERY,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}
