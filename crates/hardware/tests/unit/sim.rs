//! Simulation Harness Tests.
//!
//! Covers the cycle loop, the fixed-latency memory, the upstream peers, reset
//! and the JSON loaders.

use std::io::Write;

use chansim_core::Simulator;
use chansim_core::common::{ConfigError, InterfaceWidths, Request, Response, SimError};
use chansim_core::config::{Config, ReplacementPolicy};
use chansim_core::sim::{Downstream, LatencyMemory, RequestSource, ResponseSink, loader};
use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;

use crate::common::harness::{config, init_tracing, req};
use crate::common::mocks::downstream::MockResponder;

fn trace(addrs: &[u64]) -> Vec<Request> {
    addrs
        .iter()
        .enumerate()
        .map(|(id, &addr)| req(id as u64, addr))
        .collect()
}

// ══════════════════════════════════════════════════════════
// 1. Peers
// ══════════════════════════════════════════════════════════

#[test]
fn memory_answers_after_latency_in_order() {
    let mut mem = LatencyMemory::new(InterfaceWidths::default(), 3, 4);
    mem.preload(0x10, 0xAB);
    mem.accept_request(req(1, 0x10));
    mem.tick();
    mem.accept_request(req(2, 0x20));

    for _ in 0..2 {
        assert_eq!(mem.response(), None);
        mem.tick();
    }
    assert_eq!(mem.response(), Some(Response::new(1, 0xAB)));
    mem.response_accepted();
    assert_eq!(mem.response(), None);
    mem.tick();
    assert_eq!(mem.response(), Some(Response::new(2, mem.read(0x20))));
    assert_eq!(mem.served(), 1);
}

#[test]
fn memory_backpressures_when_queue_full() {
    let mut mem = LatencyMemory::new(InterfaceWidths::default(), 10, 2);
    assert!(mem.request_ready());
    mem.accept_request(req(1, 0x1));
    mem.accept_request(req(2, 0x2));
    assert!(!mem.request_ready());
    mem.reset();
    assert!(mem.request_ready());
    assert_eq!(mem.in_flight(), 0);
}

#[test]
fn memory_masks_data_to_width() {
    let mem = LatencyMemory::new(InterfaceWidths::new(8, 32, 12), 1, 1);
    assert!(mem.read(0x1234) <= 0xFFF);
}

#[test]
fn source_holds_request_until_accepted() {
    let mut source = RequestSource::new(trace(&[0xA, 0xB]));
    assert_eq!(source.current(), Some(req(0, 0xA)));
    assert_eq!(source.current(), Some(req(0, 0xA)));
    source.accepted();
    assert_eq!(source.current(), Some(req(1, 0xB)));
    source.accepted();
    assert!(source.is_exhausted());
    assert_eq!(source.issued(), 2);
}

#[rstest]
#[case(1, &[true, true, true, true])]
#[case(2, &[true, false, true, false])]
#[case(3, &[true, false, false, true])]
fn sink_ready_schedule(#[case] every: u64, #[case] expected: &[bool]) {
    let sink = ResponseSink::new(every);
    let ready: Vec<bool> = (0..4).map(|c| sink.is_ready(c)).collect();
    assert_eq!(ready, expected);
}

// ══════════════════════════════════════════════════════════
// 2. Simulator
// ══════════════════════════════════════════════════════════

#[test]
fn run_answers_every_request() {
    init_tracing();
    let requests = trace(&[0x10, 0x20, 0x30, 0x40, 0x50]);
    let mut sim = Simulator::new(&Config::default(), requests).unwrap();
    sim.downstream_mut().preload(0x30, 0x3333);

    let cycles = sim.run().unwrap();
    assert!(cycles > 4, "misses pay the memory latency");
    assert_eq!(sim.sink().received().len(), 5);
    assert_eq!(sim.sink().response_for(2), Some(Response::new(2, 0x3333)));
    assert_eq!(sim.channel().stats().cache_misses, 5);
    assert_eq!(sim.downstream().served(), 5);
}

#[test]
fn second_pass_over_same_addresses_hits() {
    let addrs = [0x10, 0x20, 0x30, 0x40];
    let mut sim = Simulator::new(&Config::default(), trace(&addrs)).unwrap();
    let _ = sim.run().unwrap();

    for (i, &addr) in addrs.iter().enumerate() {
        sim.push_request(req(100 + i as u64, addr));
    }
    let _ = sim.run().unwrap();

    let stats = sim.channel().stats();
    assert_eq!(stats.cache_hits, 4);
    assert_eq!(stats.forwarded, 4);
    assert_eq!(sim.downstream().served(), 4);
}

#[test]
fn tiny_tracker_serialises_misses() {
    let mut cfg = config(1, 2);
    cfg.sim.latency = 5;
    let mut sim = Simulator::new(&cfg, trace(&[0x1, 0x2, 0x3])).unwrap();
    let _ = sim.run().unwrap();
    let stats = sim.channel().stats();
    assert_eq!(stats.peak_outstanding, 1);
    assert!(stats.stalls_tracker_full > 0);
}

#[test]
fn run_reports_timeout() {
    let mut cfg = Config::default();
    cfg.sim.latency = 50;
    cfg.sim.max_cycles = 10;
    let mut sim = Simulator::new(&cfg, trace(&[0x1, 0x2])).unwrap();
    match sim.run() {
        Err(SimError::Timeout { cycles, outstanding }) => {
            assert_eq!(cycles, 10);
            assert_eq!(outstanding, 2);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn mismatched_downstream_widths_are_rejected() {
    let mem = LatencyMemory::new(InterfaceWidths::new(4, 32, 32), 1, 1);
    let err = Simulator::with_downstream(&Config::default(), mem, Vec::new()).unwrap_err();
    assert!(matches!(
        err,
        SimError::Config(ConfigError::WidthMismatch { .. })
    ));
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let mut cfg = Config::default();
    cfg.cache.policy = ReplacementPolicy::Lru;
    cfg.cache.ways = 5;
    assert!(matches!(
        Simulator::new(&cfg, Vec::new()),
        Err(SimError::Config(ConfigError::NotPowerOfTwo { .. }))
    ));
}

#[test]
fn reset_drops_in_flight_work() {
    let mut cfg = Config::default();
    cfg.sim.latency = 10;
    let mut sim = Simulator::new(&cfg, trace(&[0x1, 0x2, 0x3, 0x4])).unwrap();
    let _ = sim.tick().unwrap();
    let _ = sim.tick().unwrap();
    assert_eq!(sim.channel().outstanding(), 2);

    sim.reset();
    assert_eq!(sim.downstream().in_flight(), 0);
    let out = sim.tick().unwrap();
    assert!(!out.up_req_ready);
    assert_eq!(sim.channel().outstanding(), 0);
    assert_eq!(sim.channel().stats().resets, 1);

    let _ = sim.run().unwrap();
    let ids: Vec<u64> = sim.sink().responses().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn forwarded_misses_reach_the_responder() {
    let mut responder = MockResponder::new();
    let _ = responder.expect_widths().return_const(InterfaceWidths::default());
    let _ = responder.expect_request_ready().return_const(true);
    let _ = responder.expect_response().return_const(None::<Response>);
    let _ = responder
        .expect_accept_request()
        .with(eq(req(0, 0x40)))
        .times(1)
        .return_const(());
    let _ = responder.expect_response_accepted().times(0);
    let _ = responder.expect_tick().times(3).return_const(());

    let mut sim =
        Simulator::with_downstream(&Config::default(), responder, trace(&[0x40])).unwrap();
    for _ in 0..3 {
        let _ = sim.tick().unwrap();
    }
    assert_eq!(sim.channel().outstanding(), 1);
    assert!(!sim.is_done());
}

// ══════════════════════════════════════════════════════════
// 3. Loader
// ══════════════════════════════════════════════════════════

fn json_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn partial_config_keeps_defaults() {
    let file = json_file(r#"{ "cache": { "ways": 8, "policy": "FIFO" }, "sim": { "latency": 12 } }"#);
    let cfg = loader::load_config(file.path()).unwrap();
    assert_eq!(cfg.cache.ways, 8);
    assert_eq!(cfg.cache.policy, ReplacementPolicy::Fifo);
    assert_eq!(cfg.cache.lines, Config::default().cache.lines);
    assert_eq!(cfg.sim.latency, 12);
    assert_eq!(cfg.tracker, Config::default().tracker);
}

#[test]
fn invalid_config_file_is_a_config_error() {
    let file = json_file(r#"{ "tracker": { "cam_ways": 6 } }"#);
    assert!(matches!(
        loader::load_config(file.path()),
        Err(SimError::Config(ConfigError::NotPowerOfTwo { value: 6, .. }))
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let file = json_file("{ not json");
    assert!(matches!(
        loader::load_config(file.path()),
        Err(SimError::Json { .. })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match loader::load_trace(&path) {
        Err(SimError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[rstest]
#[case(r#"[ { "id": 0, "addr": 16 }, { "id": 1, "addr": 32 } ]"#)]
#[case(r#"{ "requests": [ { "id": 0, "addr": 16 }, { "id": 1, "addr": 32 } ] }"#)]
fn trace_accepts_bare_and_wrapped_forms(#[case] text: &str) {
    let file = json_file(text);
    let requests = loader::load_trace(file.path()).unwrap();
    assert_eq!(requests, vec![req(0, 16), req(1, 32)]);
    assert_eq!(loader::parse_trace(text).unwrap(), requests);
}
