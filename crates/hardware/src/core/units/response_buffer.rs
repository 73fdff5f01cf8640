//! Response Buffer.
//!
//! Fixed-depth FIFO of responses waiting for the upstream consumer. Two
//! producers (cache hits and retired downstream responses) may push in the
//! same tick; the head is popped when the consumer is ready.
//!
//! Free slots are counted against the occupancy committed at the end of the
//! previous tick: a pop staged in the same tick does not make room for a push.

use std::collections::VecDeque;

use tracing::trace;

use crate::common::{ConfigError, Response};

/// Bounded FIFO of upstream responses.
#[derive(Clone, Debug)]
pub struct ResponseBuffer {
    entries: VecDeque<Response>,
    depth: usize,
    /// Responses pushed this tick, in arrival order.
    pushing: Vec<Response>,
    /// Whether the head is popped this tick.
    popping: bool,
}

impl ResponseBuffer {
    /// Creates an empty buffer holding up to `depth` responses.
    pub fn new(depth: usize) -> Result<Self, ConfigError> {
        if depth == 0 {
            return Err(ConfigError::Zero {
                what: "response_buffer_depth",
            });
        }
        Ok(Self {
            entries: VecDeque::with_capacity(depth),
            depth,
            pushing: Vec::with_capacity(2),
            popping: false,
        })
    }

    /// Returns the capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.depth
    }

    /// Returns the number of committed entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the buffer is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.depth
    }

    /// Returns the number of free slots not yet claimed by a push this tick.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.depth - self.entries.len() - self.pushing.len()
    }

    /// The oldest committed response.
    pub fn head(&self) -> Option<&Response> {
        self.entries.front()
    }

    /// Iterates over the committed responses, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Response> {
        self.entries.iter()
    }

    /// Returns true if a committed response carries `id`.
    pub fn contains_id(&self, id: u64) -> bool {
        self.entries.iter().any(|rsp| rsp.id == id)
    }

    /// Stages a push. Returns false if no slot is free.
    pub fn push(&mut self, rsp: Response) -> bool {
        if self.free_slots() == 0 {
            return false;
        }
        self.pushing.push(rsp);
        true
    }

    /// Stages removal of the head and returns it.
    pub fn pop(&mut self) -> Option<Response> {
        if self.popping {
            return None;
        }
        let head = self.entries.front().copied();
        self.popping = head.is_some();
        head
    }

    /// Applies the staged pop, then the staged pushes in order.
    pub fn commit(&mut self) {
        if std::mem::take(&mut self.popping) {
            if let Some(rsp) = self.entries.pop_front() {
                trace!(id = rsp.id, "response buffer pop");
            }
        }
        for rsp in self.pushing.drain(..) {
            trace!(id = rsp.id, "response buffer push");
            self.entries.push_back(rsp);
        }
    }

    /// Empties the buffer and drops staged updates.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.pushing.clear();
        self.popping = false;
    }
}
