//! Pseudo-LRU (PLRU) Replacement Policy.
//!
//! PLRU approximates the Least Recently Used algorithm using a binary tree of bits.
//! It requires N-1 bits per set for N ways.
//!
//! The tree is stored in heap order: node 1 is the root, node `n` has children
//! `2n` and `2n + 1`, and the leaves `ways..2*ways` stand for the ways. A node bit
//! of 0 sends the victim search left, 1 sends it right.
//!
//! On every hit or fill the path from the root to the accessed way is rewritten
//! to point away from it. To find a victim the tree is walked from the root
//! following the bits. Invalidating a way points its path toward it, so the
//! freed way is the next victim.
//!
//! # Performance
//!
//! - **Time Complexity:** `update()`, `get_victim()`: O(log W)
//! - **Space Complexity:** O(S) words (one `u64` per set, W <= 64)

use super::ReplacementPolicy;

/// PLRU Policy state.
#[derive(Debug)]
pub struct PlruPolicy {
    /// Tree bits for each set; bit `n` is node `n`.
    tree: Vec<u64>,
    /// Tree depth (`log2(ways)`).
    levels: u32,
    /// Number of ways in the cache.
    ways: usize,
}

impl PlruPolicy {
    /// Creates a new PLRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity of the cache; a power of two no larger than 64.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            tree: vec![0; sets],
            levels: ways.trailing_zeros(),
            ways,
        }
    }

    /// Returns the raw tree bits of `set`.
    pub fn tree_bits(&self, set: usize) -> u64 {
        self.tree[set]
    }

    /// Rewrites the path from the root to `way`, making each node point toward
    /// (`toward == true`) or away from the way.
    fn walk(&mut self, set: usize, way: usize, toward: bool) {
        let bits = &mut self.tree[set];
        let mut node = 1usize;
        for level in (0..self.levels).rev() {
            let right = (way >> level) & 1 == 1;
            if right == toward {
                *bits |= 1 << node;
            } else {
                *bits &= !(1 << node);
            }
            node = 2 * node + usize::from(right);
        }
    }
}

impl ReplacementPolicy for PlruPolicy {
    /// Points every node on the accessed way's path away from it.
    fn update(&mut self, set: usize, way: usize) {
        self.walk(set, way, false);
    }

    /// Points every node on the invalidated way's path toward it.
    fn invalidate(&mut self, set: usize, way: usize) {
        self.walk(set, way, true);
    }

    /// Follows the tree bits from the root to a leaf.
    fn get_victim(&mut self, set: usize) -> usize {
        let bits = self.tree[set];
        let mut node = 1usize;
        for _ in 0..self.levels {
            node = 2 * node + ((bits >> node) & 1) as usize;
        }
        node - self.ways
    }
}
