//! Ready/Valid Port Signals.
//!
//! A transfer on a port happens on a tick iff the producer asserts `valid` and
//! the consumer asserts `ready` in that same tick. Payloads are modelled as
//! `Option`s: `Some` means `valid` is asserted with that payload.
//!
//! The channel has four ports:
//! 1. **Upstream request** (input): requests from the requester.
//! 2. **Upstream response** (output): responses back to the requester.
//! 3. **Downstream request** (output): misses forwarded to the responder.
//! 4. **Downstream response** (input): responses from the responder.

use super::data::{Request, Response};

/// Returns `true` when a transfer happens on a port.
#[inline]
pub const fn fires(valid: bool, ready: bool) -> bool {
    valid && ready
}

/// Signals driven into the channel by its peers for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelInputs {
    /// Synchronous reset.
    pub reset: bool,
    /// Upstream request (`valid` + payload).
    pub up_req: Option<Request>,
    /// Upstream consumer is ready for a response.
    pub up_rsp_ready: bool,
    /// Downstream responder is ready for a request.
    pub down_req_ready: bool,
    /// Downstream response (`valid` + payload).
    pub down_rsp: Option<Response>,
}

impl ChannelInputs {
    /// Inputs with both consumers ready and no producer valid.
    pub const fn idle() -> Self {
        Self {
            reset: false,
            up_req: None,
            up_rsp_ready: true,
            down_req_ready: true,
            down_rsp: None,
        }
    }

    /// Inputs asserting only the synchronous reset.
    pub const fn reset() -> Self {
        Self {
            reset: true,
            up_req: None,
            up_rsp_ready: false,
            down_req_ready: false,
            down_rsp: None,
        }
    }

    /// Presents `req` on the upstream request port.
    #[must_use]
    pub const fn with_request(mut self, req: Request) -> Self {
        self.up_req = Some(req);
        self
    }

    /// Presents `rsp` on the downstream response port.
    #[must_use]
    pub const fn with_downstream_response(mut self, rsp: Response) -> Self {
        self.down_rsp = Some(rsp);
        self
    }

    /// Sets the upstream consumer's `ready`.
    #[must_use]
    pub const fn with_upstream_ready(mut self, ready: bool) -> Self {
        self.up_rsp_ready = ready;
        self
    }

    /// Sets the downstream responder's `ready`.
    #[must_use]
    pub const fn with_downstream_ready(mut self, ready: bool) -> Self {
        self.down_req_ready = ready;
        self
    }
}

/// Signals driven by the channel for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelOutputs {
    /// Channel accepts the upstream request.
    pub up_req_ready: bool,
    /// Upstream response (`valid` + payload).
    pub up_rsp: Option<Response>,
    /// Downstream request (`valid` + payload).
    pub down_req: Option<Request>,
    /// Channel accepts the downstream response.
    pub down_rsp_ready: bool,
}

impl ChannelOutputs {
    /// The upstream request transferred into the channel this tick.
    pub fn accepted_request(&self, inputs: &ChannelInputs) -> Option<Request> {
        inputs.up_req.filter(|_| self.up_req_ready)
    }

    /// The response transferred to the upstream consumer this tick.
    pub fn delivered_response(&self, inputs: &ChannelInputs) -> Option<Response> {
        self.up_rsp.filter(|_| inputs.up_rsp_ready)
    }

    /// The request transferred to the downstream responder this tick.
    pub fn forwarded_request(&self, inputs: &ChannelInputs) -> Option<Request> {
        self.down_req.filter(|_| inputs.down_req_ready)
    }

    /// The downstream response transferred into the channel this tick.
    pub fn retired_response(&self, inputs: &ChannelInputs) -> Option<Response> {
        inputs.down_rsp.filter(|_| self.down_rsp_ready)
    }
}
