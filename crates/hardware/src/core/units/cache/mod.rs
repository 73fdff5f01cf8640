//! Set-Associative Cache.
//!
//! This module implements the response cache of the channel: an associative
//! tag/data store keyed by request address. It supports:
//! 1. **Lookup:** Read-with-hit-indication on any number of read ports per tick.
//! 2. **Fill:** One write port per tick; installs data, evicting a victim chosen
//!    by the replacement policy when the target set is full.
//! 3. **Invalidate:** Drops a resident line without writing data.
//!
//! Reads always observe the state committed at the end of the previous tick.
//! Fills, invalidations and the access reports destined for the replacement
//! policy are staged and applied by [`Cache::commit`] in this order:
//! invalidations, access reports, then the fill. An invalidation staged in the
//! same tick as a fill to the same set therefore frees its way before the fill
//! picks a victim.
//!
//! Address mapping: `set = addr % lines`, `tag = addr / lines`.

/// Cache replacement policy implementations (PLRU, LRU, FIFO, Random).
pub mod policies;

use std::fmt;

use tracing::debug;

use self::policies::{PolicyFactory, ReplacementPolicy, factory_for};
use crate::common::{ConfigError, ProtocolError};
use crate::config::CacheConfig;

/// One way of one set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Address bits above the set index.
    pub tag: u64,
    /// Cached response data.
    pub data: u64,
    /// Whether the line holds data.
    pub valid: bool,
}

/// Outcome of a cache lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheRead {
    /// Whether the address is resident.
    pub hit: bool,
    /// Resident data; zero on a miss.
    pub data: u64,
}

/// Access report awaiting the tick boundary.
#[derive(Clone, Copy, Debug)]
enum Access {
    Hit { set: usize, way: usize },
    Miss { set: usize },
}

/// Fill awaiting the tick boundary.
#[derive(Clone, Copy, Debug)]
struct Fill {
    addr: u64,
    data: u64,
}

/// Set-associative cache with deferred state updates and a pluggable replacement policy.
pub struct Cache {
    lines: Vec<CacheLine>,
    sets: usize,
    ways: usize,
    set_bits: u32,
    factory: PolicyFactory,
    policy: Box<dyn ReplacementPolicy>,
    accesses: Vec<Access>,
    invalidations: Vec<u64>,
    fill: Option<Fill>,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("sets", &self.sets)
            .field("ways", &self.ways)
            .field("occupancy", &self.occupancy())
            .finish_non_exhaustive()
    }
}

impl Cache {
    /// Creates a cache using the built-in policy named by `config`.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        Self::with_policy(config, factory_for(config.policy))
    }

    /// Creates a cache whose replacement policy is built by `factory`.
    ///
    /// The factory is kept so that a reset can rebuild the policy state.
    pub fn with_policy(
        config: &CacheConfig,
        factory: PolicyFactory,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = factory(config.lines, config.ways);
        Ok(Self {
            lines: vec![CacheLine::default(); config.lines * config.ways],
            sets: config.lines,
            ways: config.ways,
            set_bits: config.lines.trailing_zeros(),
            factory,
            policy,
            accesses: Vec::new(),
            invalidations: Vec::new(),
            fill: None,
        })
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Total number of lines.
    pub const fn capacity(&self) -> usize {
        self.sets * self.ways
    }

    /// Number of valid lines in the committed state.
    pub fn occupancy(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }

    /// Returns the committed line at `(set, way)`.
    pub fn line(&self, set: usize, way: usize) -> Option<&CacheLine> {
        if set < self.sets && way < self.ways {
            self.lines.get(set * self.ways + way)
        } else {
            None
        }
    }

    /// Splits an address into `(set, tag)`.
    fn locate(&self, addr: u64) -> (usize, u64) {
        let set = (addr & (self.sets as u64 - 1)) as usize;
        (set, addr >> self.set_bits)
    }

    fn set_lines(&self, set: usize) -> &[CacheLine] {
        let base = set * self.ways;
        &self.lines[base..base + self.ways]
    }

    fn find(&self, set: usize, tag: u64) -> Option<usize> {
        self.set_lines(set)
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Looks up `addr` without reporting the access to the replacement policy.
    pub fn probe(&self, addr: u64) -> CacheRead {
        let (set, tag) = self.locate(addr);
        match self.find(set, tag) {
            Some(way) => CacheRead {
                hit: true,
                data: self.set_lines(set)[way].data,
            },
            None => CacheRead {
                hit: false,
                data: 0,
            },
        }
    }

    /// Looks up `addr` and stages a hit or miss report for the replacement policy.
    pub fn lookup(&mut self, addr: u64) -> CacheRead {
        let (set, tag) = self.locate(addr);
        let access = match self.find(set, tag) {
            Some(way) => Access::Hit { set, way },
            None => Access::Miss { set },
        };
        self.accesses.push(access);
        self.probe(addr)
    }

    /// Stages a write on the fill port.
    ///
    /// With `valid == false` the call instead stages an invalidation of `addr`;
    /// invalidations do not occupy the fill port.
    pub fn fill(&mut self, addr: u64, data: u64, valid: bool) -> Result<(), ProtocolError> {
        if !valid {
            self.invalidate(addr);
            return Ok(());
        }
        if self.fill.is_some() {
            return Err(ProtocolError::PortBusy("cache fill"));
        }
        self.fill = Some(Fill { addr, data });
        Ok(())
    }

    /// Stages an invalidation of `addr`. A no-op at commit if `addr` is not resident.
    pub fn invalidate(&mut self, addr: u64) {
        self.invalidations.push(addr);
    }

    /// Applies every staged update: invalidations, access reports, then the fill.
    pub fn commit(&mut self) {
        for addr in std::mem::take(&mut self.invalidations) {
            let (set, tag) = self.locate(addr);
            if let Some(way) = self.find(set, tag) {
                self.lines[set * self.ways + way].valid = false;
                self.policy.invalidate(set, way);
                debug!(addr, set, way, "cache invalidate");
            }
        }

        for access in std::mem::take(&mut self.accesses) {
            match access {
                Access::Hit { set, way } => self.policy.update(set, way),
                Access::Miss { set } => self.policy.miss(set),
            }
        }

        if let Some(Fill { addr, data }) = self.fill.take() {
            let (set, tag) = self.locate(addr);
            let way = match self.find(set, tag) {
                Some(way) => way,
                None => match self.set_lines(set).iter().position(|line| !line.valid) {
                    Some(way) => way,
                    None => {
                        let victim = self.policy.get_victim(set) % self.ways;
                        let evicted = self.set_lines(set)[victim];
                        debug!(
                            set,
                            way = victim,
                            evicted_addr = (evicted.tag << self.set_bits) | set as u64,
                            "cache evict"
                        );
                        victim
                    }
                },
            };
            self.lines[set * self.ways + way] = CacheLine {
                tag,
                data,
                valid: true,
            };
            self.policy.update(set, way);
            debug!(addr, data, set, way, "cache fill");
        }
    }

    /// Clears every line, drops staged updates and rebuilds the policy state.
    pub fn reset(&mut self) {
        self.lines.fill(CacheLine::default());
        self.accesses.clear();
        self.invalidations.clear();
        self.fill = None;
        self.policy = (self.factory)(self.sets, self.ways);
    }
}
