//! Exact LRU Replacement.
//!
//! Each set keeps its ways ordered by recency in a small stack: a hit or fill
//! moves the way to the front, an invalidation sends it to the back, and the
//! back of the stack is the victim. Updates cost O(W); victim selection is O(1).

use super::ReplacementPolicy;

/// Recency-stack replacement.
#[derive(Debug)]
pub struct LruPolicy {
    /// Recency stack per set; front is most recent.
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates stacks for `sets` sets, each initially ordered `0..ways`.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: (0..sets).map(|_| (0..ways).collect()).collect(),
        }
    }

    fn take(stack: &mut Vec<usize>, way: usize) {
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            let _ = stack.remove(pos);
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Moves the accessed `way` to the MRU position.
    fn update(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        Self::take(stack, way);
        stack.insert(0, way);
    }

    /// Moves the invalidated `way` to the LRU position.
    fn invalidate(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        Self::take(stack, way);
        stack.push(way);
    }

    /// Returns the way at the bottom of the usage stack.
    fn get_victim(&mut self, set: usize) -> usize {
        self.usage[set].last().copied().unwrap_or(0)
    }
}
