//! Simulator: drives the channel against its upstream and downstream peers.
//!
//! Each cycle the simulator samples every peer's outputs into a
//! [`ChannelInputs`], evaluates the channel, then reports the completed
//! transfers back to the peers that took part in them. Peers advance only
//! after the channel has committed, so all of them observe the same edge.

use tracing::{debug, info, warn};

use super::downstream::{Downstream, LatencyMemory};
use super::driver::{RequestSource, ResponseSink};
use crate::common::{ChannelInputs, ChannelOutputs, ConfigError, Request, SimError};
use crate::config::Config;
use crate::core::CachedChannel;

/// Top-level simulator: channel, request trace, response sink and responder.
#[derive(Debug)]
pub struct Simulator<D: Downstream = LatencyMemory> {
    channel: CachedChannel,
    downstream: D,
    source: RequestSource,
    sink: ResponseSink,
    cycle: u64,
    max_cycles: u64,
    pending_reset: bool,
}

impl Simulator<LatencyMemory> {
    /// Builds a simulator backed by a [`LatencyMemory`] configured from `config.sim`.
    pub fn new(config: &Config, trace: Vec<Request>) -> Result<Self, SimError> {
        let memory = LatencyMemory::new(config.widths, config.sim.latency, config.sim.queue_depth);
        Self::with_downstream(config, memory, trace)
    }
}

impl<D: Downstream> Simulator<D> {
    /// Builds a simulator forwarding misses to `downstream`.
    pub fn with_downstream(
        config: &Config,
        downstream: D,
        trace: Vec<Request>,
    ) -> Result<Self, SimError> {
        let channel = CachedChannel::new(config)?;
        if downstream.widths() != channel.widths() {
            return Err(ConfigError::WidthMismatch {
                upstream: channel.widths(),
                downstream: downstream.widths(),
            }
            .into());
        }
        debug!(requests = trace.len(), "simulator ready");
        Ok(Self {
            channel,
            downstream,
            source: RequestSource::new(trace),
            sink: ResponseSink::new(config.sim.sink_ready_every),
            cycle: 0,
            max_cycles: config.sim.max_cycles,
            pending_reset: false,
        })
    }

    /// The channel under test.
    pub const fn channel(&self) -> &CachedChannel {
        &self.channel
    }

    /// The downstream responder.
    pub const fn downstream(&self) -> &D {
        &self.downstream
    }

    /// Mutable access to the downstream responder, e.g. to preload data.
    pub const fn downstream_mut(&mut self) -> &mut D {
        &mut self.downstream
    }

    /// The upstream request source.
    pub const fn source(&self) -> &RequestSource {
        &self.source
    }

    /// Appends a request to the upstream trace.
    pub fn push_request(&mut self, req: Request) {
        self.source.push(req);
    }

    /// The upstream response sink.
    pub const fn sink(&self) -> &ResponseSink {
        &self.sink
    }

    /// Cycles simulated so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns true once the trace is consumed and nothing is outstanding.
    pub fn is_done(&self) -> bool {
        self.source.is_exhausted() && self.channel.outstanding() == 0
    }

    /// Asserts the synchronous reset on the next tick and drops the responder's in-flight work.
    pub fn reset(&mut self) {
        self.pending_reset = true;
        self.downstream.reset();
    }

    fn sample_inputs(&self) -> ChannelInputs {
        if self.pending_reset {
            return ChannelInputs::reset();
        }
        ChannelInputs {
            reset: false,
            up_req: self.source.current(),
            up_rsp_ready: self.sink.is_ready(self.cycle),
            down_req_ready: self.downstream.request_ready(),
            down_rsp: self.downstream.response(),
        }
    }

    /// Advances the whole system by one clock cycle.
    pub fn tick(&mut self) -> Result<ChannelOutputs, SimError> {
        let inputs = self.sample_inputs();
        let outputs = self.channel.tick(&inputs)?;
        self.pending_reset = false;

        if outputs.accepted_request(&inputs).is_some() {
            self.source.accepted();
        }
        if let Some(req) = outputs.forwarded_request(&inputs) {
            self.downstream.accept_request(req);
        }
        if outputs.retired_response(&inputs).is_some() {
            self.downstream.response_accepted();
        }
        if let Some(rsp) = outputs.delivered_response(&inputs) {
            self.sink.record(self.cycle, rsp);
        }

        self.downstream.tick();
        self.cycle += 1;
        Ok(outputs)
    }

    /// Runs until every request has been answered, returning the cycles taken.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] if the cycle budget runs out first, or the
    /// channel's [`ProtocolError`](crate::common::ProtocolError) if a peer
    /// violates the protocol.
    pub fn run(&mut self) -> Result<u64, SimError> {
        while !self.is_done() {
            if self.cycle >= self.max_cycles {
                let outstanding = self.channel.outstanding() + self.source.remaining();
                warn!(cycles = self.cycle, outstanding, "cycle budget exhausted");
                return Err(SimError::Timeout {
                    cycles: self.cycle,
                    outstanding,
                });
            }
            let _ = self.tick()?;
        }
        info!(
            cycles = self.cycle,
            responses = self.sink.received().len(),
            hit_rate = self.channel.stats().hit_rate(),
            "run complete"
        );
        Ok(self.cycle)
    }
}
