//! Cached Request/Response Channel.
//!
//! The channel sits between an upstream requester and a downstream responder and
//! orchestrates three storage units:
//!
//! ```text
//!   upstream request ──► lookup ──hit──► ┐
//!                          │             ├─► arbiter ─► response buffer ─► upstream response
//!                        miss            │
//!                          ▼             │
//!   tracker allocate ◄─ forward ─► downstream request
//!                                        │
//!   downstream response ─► tracker free ─┴─► cache fill
//! ```
//!
//! Every tick is evaluated in two phases:
//! 1. **Plan:** [`CachedChannel::plan`] reads only committed state and decides
//!    every handshake of the tick. Protocol violations are detected here, before
//!    anything is staged, so a failing tick changes nothing.
//! 2. **Commit:** The plan is staged onto the cache, tracker and buffer, and each
//!    unit commits. No unit observes a peer's update before the next tick.
//!
//! Acceptance rules for the upstream request:
//! - **Hit:** the response buffer has a slot after the retire path is served.
//! - **Miss:** the tracker has room counting a same-tick retire as freed, the
//!   buffer has a slot after the retire path, and downstream is ready.

/// Retire/hit arbitration for response buffer slots.
pub mod arbiter;

use tracing::{debug, error, trace};

use self::arbiter::arbitrate;
use crate::common::{
    ChannelInputs, ChannelOutputs, ConfigError, InterfaceWidths, ProtocolError, Request, Response,
    fires,
};
use crate::config::Config;
use crate::core::units::cache::Cache;
use crate::core::units::cache::policies::{PolicyFactory, factory_for};
use crate::core::units::response_buffer::ResponseBuffer;
use crate::core::units::tracker::Tracker;
use crate::stats::ChannelStats;

/// Why an upstream request was held not-ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stall {
    /// Miss with every tracker slot in use after any same-tick retire.
    TrackerFull,
    /// No response buffer slot.
    BufferFull,
    /// The last response buffer slot went to a same-tick retire.
    LostArbitration,
    /// Miss while the downstream request port was not ready.
    DownstreamNotReady,
}

/// A downstream response being relayed upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Retire {
    /// Response to enqueue for the upstream consumer.
    pub response: Response,
    /// Address recorded in the tracker, filled in the cache.
    pub addr: u64,
}

/// Decisions for one tick, computed from committed state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickPlan {
    /// Port signals driven by the channel.
    pub outputs: ChannelOutputs,
    /// The buffer head transfers upstream.
    pub drain: bool,
    /// Downstream response accepted this tick.
    pub retire: Option<Retire>,
    /// A downstream response was presented but the buffer had no slot.
    pub retire_held: bool,
    /// Upstream request accepted this tick.
    pub accepted: Option<Request>,
    /// Response synthesized from a cache hit.
    pub hit: Option<Response>,
    /// Miss forwarded downstream.
    pub forward: Option<Request>,
    /// Reason the upstream request was held.
    pub stall: Option<Stall>,
}

/// Cache in front of a downstream responder, with outstanding-request tracking.
#[derive(Debug)]
pub struct CachedChannel {
    cache: Cache,
    tracker: Tracker,
    buffer: ResponseBuffer,
    widths: InterfaceWidths,
    stats: ChannelStats,
}

impl CachedChannel {
    /// Builds a channel using the built-in replacement policy named in `config`.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Self::with_policy_factory(config, factory_for(config.cache.policy))
    }

    /// Builds a channel whose cache uses the policy constructed by `factory`.
    pub fn with_policy_factory(
        config: &Config,
        factory: PolicyFactory,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cache: Cache::with_policy(&config.cache, factory)?,
            tracker: Tracker::new(config.tracker.cam_ways)?,
            buffer: ResponseBuffer::new(config.response_buffer_depth)?,
            widths: config.widths,
            stats: ChannelStats::default(),
        })
    }

    /// The response cache.
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// The outstanding-request tracker.
    pub const fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// The upstream response buffer.
    pub const fn response_buffer(&self) -> &ResponseBuffer {
        &self.buffer
    }

    /// Field widths of all four ports.
    pub const fn widths(&self) -> InterfaceWidths {
        self.widths
    }

    /// Collected counters.
    pub const fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    /// Accepted requests whose response has not yet been delivered upstream.
    pub fn outstanding(&self) -> usize {
        self.tracker.occupancy() + self.buffer.len()
    }

    /// Evaluates one tick and commits its state updates.
    ///
    /// With `reset` asserted every unit is cleared and no port transfers.
    /// On a protocol violation nothing is committed and the error is returned.
    pub fn tick(&mut self, inputs: &ChannelInputs) -> Result<ChannelOutputs, ProtocolError> {
        self.stats.cycles += 1;
        if inputs.reset {
            self.reset();
            return Ok(ChannelOutputs::default());
        }
        let plan = self.plan(inputs)?;
        self.commit(&plan);
        trace!(
            cycle = self.stats.cycles,
            accepted = ?plan.accepted.map(|r| r.id),
            forward = ?plan.forward.map(|r| r.id),
            retire = ?plan.retire.map(|r| r.response.id),
            stall = ?plan.stall,
            "tick"
        );
        Ok(plan.outputs)
    }

    /// Decides every handshake of a tick from the committed state, without side effects.
    pub fn plan(&self, inputs: &ChannelInputs) -> Result<TickPlan, ProtocolError> {
        let mut plan = TickPlan::default();
        if inputs.reset {
            return Ok(plan);
        }

        if let Some(req) = &inputs.up_req {
            self.widths.check_request(req)?;
        }
        if let Some(rsp) = &inputs.down_rsp {
            self.widths.check_response(rsp)?;
        }

        plan.outputs.up_rsp = self.buffer.head().copied();
        plan.drain = fires(plan.outputs.up_rsp.is_some(), inputs.up_rsp_ready);

        let retiring = match inputs.down_rsp {
            Some(rsp) => {
                let Some(entry) = self
                    .tracker
                    .lookup(rsp.id)
                    .and_then(|index| self.tracker.entry(index))
                else {
                    error!(id = rsp.id, "downstream response matches no outstanding request");
                    return Err(ProtocolError::UnknownResponseId(rsp.id));
                };
                Some(Retire {
                    response: rsp,
                    addr: entry.addr,
                })
            }
            None => None,
        };

        if let Some(req) = inputs.up_req {
            let drained = plan.outputs.up_rsp.filter(|_| plan.drain).map(|rsp| rsp.id);
            let buffered = self.buffer.contains_id(req.id) && drained != Some(req.id);
            if buffered || self.tracker.lookup(req.id).is_some() {
                error!(id = req.id, "upstream request reuses an outstanding id");
                return Err(ProtocolError::DuplicateRequestId(req.id));
            }
        }

        let grant = arbitrate(
            self.buffer.free_slots(),
            retiring.is_some(),
            inputs.up_req.is_some(),
        );
        plan.outputs.down_rsp_ready = grant.downstream_ready;
        if grant.retire {
            plan.retire = retiring;
        } else {
            plan.retire_held = retiring.is_some();
        }

        let Some(req) = inputs.up_req else {
            return Ok(plan);
        };

        let buffer_stall = if grant.contended {
            Stall::LostArbitration
        } else {
            Stall::BufferFull
        };
        let read = self.cache.probe(req.addr);
        let tracker_room = self.tracker.has_room_after(plan.retire.is_some());

        plan.stall = if read.hit {
            (!grant.upstream).then_some(buffer_stall)
        } else if !tracker_room {
            Some(Stall::TrackerFull)
        } else if !grant.upstream {
            Some(buffer_stall)
        } else if !inputs.down_req_ready {
            Some(Stall::DownstreamNotReady)
        } else {
            None
        };

        if plan.stall.is_none() {
            plan.accepted = Some(req);
            plan.outputs.up_req_ready = true;
            if read.hit {
                plan.hit = Some(Response::new(req.id, read.data));
            } else {
                plan.forward = Some(req);
                plan.outputs.down_req = Some(req);
            }
        }
        Ok(plan)
    }

    /// Stages `plan` onto the storage units and commits them.
    ///
    /// `plan` has already matched the retire id, rejected duplicate ids and
    /// checked tracker room, so no staging call here can fail.
    fn commit(&mut self, plan: &TickPlan) {
        if plan.drain {
            let _ = self.buffer.pop();
            self.stats.responses_delivered += 1;
        }

        if let Some(retire) = plan.retire {
            let freed = self.tracker.free(retire.response.id);
            debug_assert!(freed.is_ok(), "retire of an id with no tracker entry");
            let filled = self.cache.fill(retire.addr, retire.response.data, true);
            debug_assert!(filled.is_ok(), "second fill staged in one tick");
            let pushed = self.buffer.push(retire.response);
            debug_assert!(pushed, "retire granted without a buffer slot");
            self.stats.retired += 1;
            self.stats.fills += 1;
            debug!(
                id = retire.response.id,
                addr = retire.addr,
                data = retire.response.data,
                "retire"
            );
        } else if plan.retire_held {
            self.stats.retire_backpressure += 1;
        }

        if let Some(req) = plan.accepted {
            let _ = self.cache.lookup(req.addr);
            self.stats.requests_accepted += 1;
        }

        if let Some(hit) = plan.hit {
            let pushed = self.buffer.push(hit);
            debug_assert!(pushed, "hit granted without a buffer slot");
            self.stats.cache_hits += 1;
            debug!(id = hit.id, data = hit.data, "cache hit");
        }

        if let Some(req) = plan.forward {
            let slot = self.tracker.allocate(req.id, req.addr);
            debug_assert!(
                matches!(slot, Ok(Some(_))),
                "miss forwarded without a tracker slot"
            );
            self.stats.cache_misses += 1;
            self.stats.forwarded += 1;
            debug!(id = req.id, addr = req.addr, "miss forwarded");
        }

        match plan.stall {
            Some(Stall::TrackerFull) => self.stats.stalls_tracker_full += 1,
            Some(Stall::BufferFull) => self.stats.stalls_buffer_full += 1,
            Some(Stall::LostArbitration) => self.stats.arbitration_conflicts += 1,
            Some(Stall::DownstreamNotReady) => self.stats.stalls_downstream_not_ready += 1,
            None => {}
        }

        self.cache.commit();
        self.tracker.commit();
        self.buffer.commit();
        self.stats.peak_outstanding = self.stats.peak_outstanding.max(self.tracker.occupancy());
    }

    /// Clears the cache, tracker and response buffer.
    pub fn reset(&mut self) {
        self.cache.reset();
        self.tracker.reset();
        self.buffer.reset();
        self.stats.resets += 1;
        debug!("channel reset");
    }
}
