//! Downstream Responder Models.
//!
//! This module defines the `Downstream` trait implemented by anything the
//! channel forwards misses to, and `LatencyMemory`, a backing store that
//! answers each request a fixed number of ticks after accepting it.

use std::collections::{BTreeMap, VecDeque};

use tracing::trace;

use crate::common::{InterfaceWidths, Request, Response};

/// Trait for responders attached to the channel's downstream ports.
///
/// The simulator samples `request_ready` and `response` before evaluating a
/// tick, reports the completed transfers, then calls `tick`.
pub trait Downstream {
    /// Field widths of the responder's ports; must match the channel's.
    fn widths(&self) -> InterfaceWidths;

    /// `ready` on the downstream request port.
    fn request_ready(&self) -> bool;

    /// Called when a request transferred this tick.
    fn accept_request(&mut self, req: Request);

    /// The response presented this tick (`valid` + payload). Must stay stable until accepted.
    fn response(&self) -> Option<Response>;

    /// Called when the presented response transferred this tick.
    fn response_accepted(&mut self);

    /// Advances the responder by one tick.
    fn tick(&mut self);

    /// Drops everything in flight.
    fn reset(&mut self) {}
}

/// A request waiting out its latency.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    ready_at: u64,
    response: Response,
}

/// Fixed-latency, in-order memory.
///
/// Data for an address comes from the preloaded contents, or from
/// [`LatencyMemory::pattern`] for addresses never written.
#[derive(Clone, Debug)]
pub struct LatencyMemory {
    widths: InterfaceWidths,
    latency: u64,
    queue_depth: usize,
    contents: BTreeMap<u64, u64>,
    in_flight: VecDeque<InFlight>,
    now: u64,
    served: u64,
}

impl LatencyMemory {
    /// Creates a memory answering after `latency` ticks with up to
    /// `queue_depth` requests in flight.
    pub fn new(widths: InterfaceWidths, latency: u64, queue_depth: usize) -> Self {
        Self {
            widths,
            latency,
            queue_depth,
            contents: BTreeMap::new(),
            in_flight: VecDeque::with_capacity(queue_depth),
            now: 0,
            served: 0,
        }
    }

    /// Preloads `data` at `addr`.
    pub fn preload(&mut self, addr: u64, data: u64) {
        let _ = self
            .contents
            .insert(addr, data & InterfaceWidths::mask(self.widths.data_width));
    }

    /// Returns the data this memory answers for `addr`.
    pub fn read(&self, addr: u64) -> u64 {
        self.contents
            .get(&addr)
            .copied()
            .unwrap_or_else(|| Self::pattern(addr) & InterfaceWidths::mask(self.widths.data_width))
    }

    /// Deterministic default contents for addresses never written.
    pub const fn pattern(addr: u64) -> u64 {
        addr.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0xA5A5_A5A5_A5A5_A5A5
    }

    /// Requests accepted but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Responses delivered so far.
    pub const fn served(&self) -> u64 {
        self.served
    }
}

impl Downstream for LatencyMemory {
    fn widths(&self) -> InterfaceWidths {
        self.widths
    }

    fn request_ready(&self) -> bool {
        self.in_flight.len() < self.queue_depth
    }

    fn accept_request(&mut self, req: Request) {
        trace!(id = req.id, addr = req.addr, now = self.now, "memory accept");
        self.in_flight.push_back(InFlight {
            ready_at: self.now + self.latency,
            response: Response::new(req.id, self.read(req.addr)),
        });
    }

    fn response(&self) -> Option<Response> {
        self.in_flight
            .front()
            .filter(|head| head.ready_at <= self.now)
            .map(|head| head.response)
    }

    fn response_accepted(&mut self) {
        if self.in_flight.pop_front().is_some() {
            self.served += 1;
        }
    }

    fn tick(&mut self) {
        self.now += 1;
    }

    fn reset(&mut self) {
        self.in_flight.clear();
    }
}
