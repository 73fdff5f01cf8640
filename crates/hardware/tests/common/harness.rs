use chansim_core::CachedChannel;
use chansim_core::common::{ChannelInputs, ChannelOutputs, Request, Response};
use chansim_core::config::Config;

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub const fn req(id: u64, addr: u64) -> Request {
    Request::new(id, addr)
}

pub const fn rsp(id: u64, data: u64) -> Response {
    Response::new(id, data)
}

/// Default configuration with the given tracker capacity and buffer depth.
pub fn config(cam_ways: usize, buffer_depth: usize) -> Config {
    let mut config = Config::default();
    config.tracker.cam_ways = cam_ways;
    config.response_buffer_depth = buffer_depth;
    config
}

/// Drives a single channel one tick at a time.
pub struct ChannelHarness {
    pub channel: CachedChannel,
}

impl ChannelHarness {
    pub fn new(config: &Config) -> Self {
        init_tracing();
        Self {
            channel: CachedChannel::new(config).expect("valid test configuration"),
        }
    }

    /// Channel with `cam_ways` tracker slots and a `buffer_depth` response buffer.
    pub fn with_capacity(cam_ways: usize, buffer_depth: usize) -> Self {
        Self::new(&config(cam_ways, buffer_depth))
    }

    /// Evaluates one tick, failing the test on a protocol violation.
    pub fn step(&mut self, inputs: ChannelInputs) -> ChannelOutputs {
        self.channel
            .tick(&inputs)
            .expect("tick raised a protocol violation")
    }

    /// Presents `req` with downstream ready and the upstream consumer stalled.
    pub fn offer(&mut self, req: Request) -> ChannelOutputs {
        self.step(
            ChannelInputs::idle()
                .with_request(req)
                .with_upstream_ready(false),
        )
    }

    /// Ticks with nothing presented and the upstream consumer stalled.
    pub fn hold(&mut self) -> ChannelOutputs {
        self.step(ChannelInputs::idle().with_upstream_ready(false))
    }

    /// Ticks with nothing presented until the response buffer is empty.
    pub fn drain(&mut self) -> Vec<Response> {
        let mut delivered = Vec::new();
        while !self.channel.response_buffer().is_empty() {
            let inputs = ChannelInputs::idle();
            let out = self.step(inputs);
            delivered.extend(out.delivered_response(&inputs));
        }
        delivered
    }

    /// Installs `data` at `addr` through a full miss, retire and drain sequence.
    pub fn warm(&mut self, id: u64, addr: u64, data: u64) {
        let out = self.offer(req(id, addr));
        assert_eq!(out.down_req, Some(req(id, addr)), "warm-up request must miss");
        let _ = self.step(ChannelInputs::idle().with_downstream_response(rsp(id, data)));
        let delivered = self.drain();
        assert_eq!(delivered, vec![rsp(id, data)]);
        assert!(self.channel.cache().probe(addr).hit);
    }
}
