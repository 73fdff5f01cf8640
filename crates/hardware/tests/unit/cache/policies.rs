//! Cache Replacement Policy Tests.
//!
//! Verifies the victim selection logic for PLRU, LRU, FIFO and Random policies.
//! Each policy implements `ReplacementPolicy` and is exercised in isolation,
//! with no cache around it.

use chansim_core::core::units::cache::policies::{
    FifoPolicy, LruPolicy, PlruPolicy, RandomPolicy, ReplacementPolicy,
};
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. PLRU Policy
// ══════════════════════════════════════════════════════════

/// A fresh tree has every bit clear, so the search runs to way 0.
#[test]
fn plru_initial_victim_is_way_zero() {
    let mut policy = PlruPolicy::new(1, 8);
    assert_eq!(policy.get_victim(0), 0);
}

/// Touching ways 0..4 in order rewrites every node, leaving way 0 as victim.
#[test]
fn plru_sequential_access_points_to_oldest() {
    let mut policy = PlruPolicy::new(1, 4);
    for way in 0..4 {
        policy.update(0, way);
    }
    assert_eq!(policy.tree_bits(0), 0);
    assert_eq!(policy.get_victim(0), 0);
}

/// Re-accessing way 0 sends the search to the other half of the tree.
/// Exact LRU would pick way 1; the tree only remembers way 3 within the right half.
#[test]
fn plru_reaccess_flips_root() {
    let mut policy = PlruPolicy::new(1, 4);
    for way in 0..4 {
        policy.update(0, way);
    }
    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 2);
}

/// An invalidated way becomes the next victim.
#[test]
fn plru_invalidate_points_tree_at_way() {
    let mut policy = PlruPolicy::new(1, 4);
    for way in 0..4 {
        policy.update(0, way);
    }
    policy.invalidate(0, 2);
    assert_eq!(policy.get_victim(0), 2);
}

/// Trees of different sets are independent.
#[test]
fn plru_sets_are_independent() {
    let mut policy = PlruPolicy::new(2, 2);
    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 1);
    assert_eq!(policy.get_victim(1), 0);
}

proptest! {
    /// The way just accessed is never the victim, whatever the history.
    #[test]
    fn plru_never_evicts_most_recent(
        log_ways in 1u32..=6,
        history in proptest::collection::vec(0usize..64, 1..64),
    ) {
        let ways = 1usize << log_ways;
        let mut policy = PlruPolicy::new(1, ways);
        for way in history {
            let way = way % ways;
            policy.update(0, way);
            prop_assert_ne!(policy.get_victim(0), way);
        }
    }
}

// ══════════════════════════════════════════════════════════
// 2. LRU Policy
// ══════════════════════════════════════════════════════════

/// The initial stack is [0, 1, 2, 3] with index 0 as MRU, so way 3 goes first.
#[test]
fn lru_initial_victim_is_last_way() {
    let mut policy = LruPolicy::new(1, 4);
    assert_eq!(policy.get_victim(0), 3);
}

#[test]
fn lru_evicts_true_lru_after_reaccess() {
    let mut policy = LruPolicy::new(1, 4);
    for way in 0..4 {
        policy.update(0, way);
    }
    assert_eq!(policy.get_victim(0), 0);

    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 1);

    policy.update(0, 1);
    assert_eq!(policy.get_victim(0), 2);
}

#[test]
fn lru_invalidate_moves_way_to_bottom() {
    let mut policy = LruPolicy::new(1, 4);
    for way in 0..4 {
        policy.update(0, way);
    }
    policy.invalidate(0, 3);
    assert_eq!(policy.get_victim(0), 3);
}

// ══════════════════════════════════════════════════════════
// 3. FIFO Policy
// ══════════════════════════════════════════════════════════

/// Successive evictions walk the ways in insertion order.
#[test]
fn fifo_cycles_through_ways() {
    let mut policy = FifoPolicy::new(1, 4);
    for expected in [0, 1, 2, 3, 0, 1] {
        let victim = policy.get_victim(0);
        assert_eq!(victim, expected);
        policy.update(0, victim);
    }
}

/// Hits, including one on the oldest way, leave the order alone.
#[test]
fn fifo_ignores_hits() {
    let mut policy = FifoPolicy::new(1, 4);
    policy.update(0, 0);
    policy.update(0, 2);
    assert_eq!(policy.get_victim(0), 0);
}

/// Each set keeps its own pointer.
#[test]
fn fifo_sets_are_independent() {
    let mut policy = FifoPolicy::new(2, 2);
    assert_eq!(policy.get_victim(0), 0);
    assert_eq!(policy.get_victim(1), 0);
    assert_eq!(policy.get_victim(0), 1);
}

// ══════════════════════════════════════════════════════════
// 4. Random Policy
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(1)]
#[case(2)]
#[case(8)]
#[case(64)]
fn random_victim_in_range(#[case] ways: usize) {
    let mut policy = RandomPolicy::new(1, ways);
    for _ in 0..256 {
        assert!(policy.get_victim(0) < ways);
    }
}

/// Two policies built the same way produce the same sequence.
#[test]
fn random_is_reproducible() {
    let mut a = RandomPolicy::new(1, 16);
    let mut b = RandomPolicy::new(1, 16);
    let xs: Vec<usize> = (0..32).map(|_| a.get_victim(0)).collect();
    let ys: Vec<usize> = (0..32).map(|_| b.get_victim(0)).collect();
    assert_eq!(xs, ys);
}
