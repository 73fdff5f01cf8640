//! Cache Replacement Policies.
//!
//! Implements the algorithms for selecting victim ways in the set-associative cache.
//! A policy sees only per-way events (hit, fill, miss, invalidate) and never the
//! addresses or data involved, so each one can be exercised in isolation.
//!
//! # Policies
//!
//! - `Plru`: Pseudo-LRU (tree-based). The default.
//! - `Lru`: Least Recently Used.
//! - `Fifo`: First-In, First-Out.
//! - `Random`: Random selection.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// Pseudo-LRU (tree-based) replacement policy.
pub mod plru;

/// Random replacement policy.
pub mod random;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use plru::PlruPolicy;
pub use random::RandomPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for cache replacement policies.
///
/// The cache reports every access it commits; the policy answers which way of a
/// full set to evict. Because the cache reports a fill's own way through
/// [`update`](Self::update) only after the victim is chosen, and re-fills of a
/// resident address reuse their way, a policy is never asked to evict the line
/// being installed.
pub trait ReplacementPolicy: Send + Sync {
    /// Records a hit on, or a fill into, `way` of `set`.
    fn update(&mut self, set: usize, way: usize);

    /// Records a lookup in `set` that matched no way.
    fn miss(&mut self, _set: usize) {}

    /// Records that `way` of `set` no longer holds a valid line.
    fn invalidate(&mut self, _set: usize, _way: usize) {}

    /// Selects the way to evict from a full `set`.
    fn get_victim(&mut self, set: usize) -> usize;
}

/// Constructs a policy for a cache of `(sets, ways)`.
pub type PolicyFactory = Box<dyn Fn(usize, usize) -> Box<dyn ReplacementPolicy> + Send + Sync>;

/// Returns the factory for a built-in policy.
pub fn factory_for(kind: PolicyType) -> PolicyFactory {
    Box::new(move |sets, ways| -> Box<dyn ReplacementPolicy> {
        match kind {
            PolicyType::Plru => Box::new(PlruPolicy::new(sets, ways)),
            PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
            PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
            PolicyType::Random => Box::new(RandomPolicy::new(sets, ways)),
        }
    })
}
