//! Response Buffer Arbitration.
//!
//! Two producers compete for response-buffer slots in a tick: the retire path
//! (a downstream response being relayed upstream) and the upstream request
//! path (a cache hit to enqueue, or a miss whose eventual response needs room).
//! The retire path always wins the last free slot. Losing the slot holds the
//! upstream request not-ready until a slot frees.

/// Slot grants for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Grant {
    /// `ready` on the downstream response port.
    pub downstream_ready: bool,
    /// A presented downstream response takes a slot.
    pub retire: bool,
    /// A presented upstream request has a slot after the retire.
    pub upstream: bool,
    /// The upstream request lost the last slot to the retire.
    pub contended: bool,
}

/// Grants slots to the retire and upstream paths given the buffer's free slots.
pub const fn arbitrate(free_slots: usize, retire_valid: bool, upstream_valid: bool) -> Grant {
    let downstream_ready = free_slots > 0;
    let retire = retire_valid && downstream_ready;
    let remaining = free_slots - retire as usize;
    Grant {
        downstream_ready,
        retire,
        upstream: upstream_valid && remaining > 0,
        contended: upstream_valid && retire && remaining == 0,
    }
}
