//! Pseudo-Random Replacement.
//!
//! Victims come from a xorshift64 generator with a fixed seed, so a given
//! trace always evicts the same ways.

use super::ReplacementPolicy;

/// Fixed seed of the xorshift generator.
const SEED: u64 = 123_456_789;

/// Random replacement.
#[derive(Debug)]
pub struct RandomPolicy {
    /// Associativity.
    ways: usize,
    /// xorshift64 state.
    state: u64,
}

impl RandomPolicy {
    /// Creates a generator over `ways` ways. The set count is irrelevant here.
    pub const fn new(_sets: usize, ways: usize) -> Self {
        Self { ways, state: SEED }
    }
}

impl ReplacementPolicy for RandomPolicy {
    /// Access patterns do not affect random replacement.
    fn update(&mut self, _set: usize, _way: usize) {}

    /// Generates a pseudo-random number and maps it to a valid way index.
    fn get_victim(&mut self, _set: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % self.ways as u64) as usize
    }
}
