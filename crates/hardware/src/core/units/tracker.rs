//! Outstanding-Request Tracker.
//!
//! A fixed-capacity content-addressable table mapping a request id to the
//! address it is waiting on. The channel allocates an entry for every miss it
//! forwards downstream and frees it when the matching downstream response
//! arrives, which also yields the address to fill in the cache.
//!
//! 1. **Lookup:** Associative search by id over the committed entries.
//! 2. **Free:** One port per tick; stages the invalidation of a matching entry.
//! 3. **Allocate:** One port per tick; claims a free entry, counting an entry
//!    freed in the same tick as free. [`Tracker::has_room_after`] reports the
//!    post-free occupancy the channel accepts a miss against, so a miss can be
//!    accepted in the same tick as the response that retires an older one.
//!
//! Staged updates are applied by [`Tracker::commit`]: the free first, then the
//! allocation (which may land in the slot just freed).

use tracing::{debug, error};

use crate::common::{ConfigError, ProtocolError};
use crate::config::require_power_of_two;

/// One tracker slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackerEntry {
    /// Id of the outstanding request.
    pub id: u64,
    /// Address the request is waiting on.
    pub addr: u64,
    /// Whether the slot is occupied.
    pub valid: bool,
}

/// Capacity-bounded associative table of outstanding requests.
#[derive(Clone, Debug)]
pub struct Tracker {
    entries: Vec<TrackerEntry>,
    /// Slot being freed this tick.
    freeing: Option<usize>,
    /// Slot and entry being allocated this tick.
    allocating: Option<(usize, TrackerEntry)>,
}

impl Tracker {
    /// Creates an empty tracker with `cam_ways` slots.
    pub fn new(cam_ways: usize) -> Result<Self, ConfigError> {
        require_power_of_two("tracker.cam_ways", cam_ways)?;
        Ok(Self {
            entries: vec![TrackerEntry::default(); cam_ways],
            freeing: None,
            allocating: None,
        })
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of valid entries in the committed state.
    pub fn occupancy(&self) -> usize {
        self.entries.iter().filter(|entry| entry.valid).count()
    }

    /// Returns true if every slot is valid in the committed state.
    pub fn is_full(&self) -> bool {
        self.occupancy() == self.capacity()
    }

    /// Returns true if no slot is valid in the committed state.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| !entry.valid)
    }

    /// Returns true if a slot is free once a committed entry is released, when
    /// `releasing` is set. Ignores anything already staged.
    pub fn has_room_after(&self, releasing: bool) -> bool {
        self.occupancy().saturating_sub(usize::from(releasing)) < self.capacity()
    }

    /// Returns true if an allocation staged now would succeed, counting a
    /// staged free as room.
    pub fn has_room(&self) -> bool {
        self.allocating.is_none() && self.has_room_after(self.freeing.is_some())
    }

    /// Associative search by id over the committed entries.
    pub fn lookup(&self, id: u64) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.valid && entry.id == id)
    }

    /// Returns the committed entry in slot `index`.
    pub fn entry(&self, index: usize) -> Option<&TrackerEntry> {
        self.entries.get(index)
    }

    /// Iterates over the valid committed entries.
    pub fn iter(&self) -> impl Iterator<Item = &TrackerEntry> {
        self.entries.iter().filter(|entry| entry.valid)
    }

    /// Stages the invalidation of the entry matching `id` and returns it.
    ///
    /// An id with no entry is a protocol violation: the response would have no
    /// requester to go to.
    pub fn free(&mut self, id: u64) -> Result<TrackerEntry, ProtocolError> {
        if self.freeing.is_some() {
            return Err(ProtocolError::PortBusy("tracker free"));
        }
        let Some(index) = self.lookup(id) else {
            error!(id, "tracker free for an id with no outstanding entry");
            return Err(ProtocolError::UnknownResponseId(id));
        };
        self.freeing = Some(index);
        Ok(self.entries[index])
    }

    /// Stages a new entry for `(id, addr)`.
    ///
    /// Returns the slot index, or `Ok(None)` when no slot is free after
    /// accounting for a same-tick free. A full tracker is backpressure, not an
    /// error; an id already held by an entry that is not being freed is.
    pub fn allocate(&mut self, id: u64, addr: u64) -> Result<Option<usize>, ProtocolError> {
        if self.allocating.is_some() {
            return Err(ProtocolError::PortBusy("tracker allocate"));
        }
        if let Some(index) = self.lookup(id) {
            if self.freeing != Some(index) {
                error!(id, index, "tracker allocate for an id that is already outstanding");
                return Err(ProtocolError::DuplicateRequestId(id));
            }
        }
        let slot = self
            .entries
            .iter()
            .position(|entry| !entry.valid)
            .or(self.freeing);
        if let Some(index) = slot {
            self.allocating = Some((
                index,
                TrackerEntry {
                    id,
                    addr,
                    valid: true,
                },
            ));
        }
        Ok(slot)
    }

    /// Applies the staged free, then the staged allocation.
    pub fn commit(&mut self) {
        if let Some(index) = self.freeing.take() {
            let entry = &mut self.entries[index];
            debug!(id = entry.id, addr = entry.addr, index, "tracker free");
            entry.valid = false;
        }
        if let Some((index, entry)) = self.allocating.take() {
            debug!(id = entry.id, addr = entry.addr, index, "tracker allocate");
            self.entries[index] = entry;
        }
    }

    /// Invalidates every entry and drops staged updates.
    pub fn reset(&mut self) {
        self.entries.fill(TrackerEntry::default());
        self.freeing = None;
        self.allocating = None;
    }
}
