//! Upstream Peers.
//!
//! `RequestSource` replays a request trace onto the upstream request port,
//! holding each request stable until the channel accepts it. `ResponseSink`
//! consumes upstream responses on a configurable readiness schedule and records
//! when each one arrived.

use std::collections::VecDeque;

use crate::common::{Request, Response};

/// Replays a fixed sequence of requests.
#[derive(Clone, Debug, Default)]
pub struct RequestSource {
    pending: VecDeque<Request>,
    issued: usize,
}

impl RequestSource {
    /// Creates a source that will present `trace` in order.
    pub fn new(trace: impl IntoIterator<Item = Request>) -> Self {
        Self {
            pending: trace.into_iter().collect(),
            issued: 0,
        }
    }

    /// Appends a request to the end of the trace.
    pub fn push(&mut self, req: Request) {
        self.pending.push_back(req);
    }

    /// The request presented this tick.
    pub fn current(&self) -> Option<Request> {
        self.pending.front().copied()
    }

    /// Called when the presented request transferred.
    pub fn accepted(&mut self) {
        if self.pending.pop_front().is_some() {
            self.issued += 1;
        }
    }

    /// Requests not yet accepted.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Requests accepted so far.
    pub const fn issued(&self) -> usize {
        self.issued
    }

    /// Returns true once every request has been accepted.
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Records responses delivered upstream.
#[derive(Clone, Debug)]
pub struct ResponseSink {
    ready_every: u64,
    received: Vec<(u64, Response)>,
}

impl ResponseSink {
    /// Creates a sink asserting `ready` on every `ready_every`-th tick.
    pub const fn new(ready_every: u64) -> Self {
        Self {
            ready_every,
            received: Vec::new(),
        }
    }

    /// `ready` on the upstream response port at `cycle`.
    pub const fn is_ready(&self, cycle: u64) -> bool {
        self.ready_every <= 1 || cycle % self.ready_every == 0
    }

    /// Records a response delivered at `cycle`.
    pub fn record(&mut self, cycle: u64, rsp: Response) {
        self.received.push((cycle, rsp));
    }

    /// Every `(cycle, response)` received so far, in arrival order.
    pub fn received(&self) -> &[(u64, Response)] {
        &self.received
    }

    /// The responses received so far, in arrival order.
    pub fn responses(&self) -> impl Iterator<Item = &Response> {
        self.received.iter().map(|(_, rsp)| rsp)
    }

    /// The response received for `id`, if any.
    pub fn response_for(&self, id: u64) -> Option<Response> {
        self.responses().find(|rsp| rsp.id == id).copied()
    }
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self::new(1)
    }
}
