//! First-In, First-Out Replacement.
//!
//! One pointer per set names the oldest way. The cache fills invalid ways
//! lowest-first, so after warm-up the ways were installed in index order and
//! each eviction moves the pointer to the next-oldest. Hits never reorder.

use super::ReplacementPolicy;

/// Insertion-order replacement.
#[derive(Debug)]
pub struct FifoPolicy {
    /// Oldest way, per set.
    oldest: Vec<usize>,
    /// Associativity.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a policy whose pointers all start at way 0.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            oldest: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn update(&mut self, _set: usize, _way: usize) {}

    /// Returns the oldest way; the fill that follows makes it the newest.
    fn get_victim(&mut self, set: usize) -> usize {
        let victim = self.oldest[set];
        self.oldest[set] = (victim + 1) % self.ways;
        victim
    }
}
