//! Channel statistics collection and reporting.
//!
//! This module tracks performance counters for the cached channel. It provides:
//! 1. **Traffic:** Accepted requests, delivered responses, forwarded misses, retires.
//! 2. **Cache:** Hits, misses, fills and the derived hit rate.
//! 3. **Backpressure:** Why upstream requests and downstream responses were held.

/// Counters collected by a [`CachedChannel`](crate::core::channel::CachedChannel).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Ticks evaluated, including reset ticks.
    pub cycles: u64,
    /// Ticks with reset asserted.
    pub resets: u64,
    /// Upstream requests accepted.
    pub requests_accepted: u64,
    /// Accepted requests served from the cache.
    pub cache_hits: u64,
    /// Accepted requests forwarded downstream.
    pub cache_misses: u64,
    /// Requests transferred on the downstream request port.
    pub forwarded: u64,
    /// Downstream responses accepted and relayed.
    pub retired: u64,
    /// Lines written by the fill port.
    pub fills: u64,
    /// Responses transferred to the upstream consumer.
    pub responses_delivered: u64,

    /// Miss held because the tracker was full.
    pub stalls_tracker_full: u64,
    /// Request held because the response buffer was full.
    pub stalls_buffer_full: u64,
    /// Miss held because the downstream request port was not ready.
    pub stalls_downstream_not_ready: u64,
    /// Request held because a retire took the last buffer slot.
    pub arbitration_conflicts: u64,
    /// Downstream response held because the response buffer was full.
    pub retire_backpressure: u64,

    /// Largest tracker occupancy observed at a tick boundary.
    pub peak_outstanding: usize,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"cache"`, `"backpressure"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "cache", "backpressure"];

impl ChannelStats {
    /// Fraction of accepted requests served from the cache, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }

    /// Total ticks an upstream request spent held not-ready.
    pub const fn upstream_stalls(&self) -> u64 {
        self.stalls_tracker_full
            + self.stalls_buffer_full
            + self.stalls_downstream_not_ready
            + self.arbitration_conflicts
    }

    /// Renders the requested sections; an empty slice renders all of them.
    pub fn report(&self, sections: &[String]) -> String {
        use std::fmt::Write;

        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = self.cycles.max(1) as f64;
        let mut out = String::new();

        if want("summary") {
            let _ = writeln!(out, "==========================================================");
            let _ = writeln!(out, "CACHED CHANNEL STATISTICS");
            let _ = writeln!(out, "==========================================================");
            let _ = writeln!(out, "sim_cycles               {}", self.cycles);
            let _ = writeln!(out, "sim_resets               {}", self.resets);
            let _ = writeln!(out, "requests.accepted        {}", self.requests_accepted);
            let _ = writeln!(out, "responses.delivered      {}", self.responses_delivered);
            let _ = writeln!(
                out,
                "throughput               {:.4} rsp/cycle",
                self.responses_delivered as f64 / cyc
            );
            let _ = writeln!(out, "tracker.peak             {}", self.peak_outstanding);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("cache") {
            let _ = writeln!(out, "CACHE");
            let _ = writeln!(out, "  cache.hits             {}", self.cache_hits);
            let _ = writeln!(out, "  cache.misses           {}", self.cache_misses);
            let _ = writeln!(out, "  cache.hit_rate         {:.2}%", self.hit_rate() * 100.0);
            let _ = writeln!(out, "  cache.fills            {}", self.fills);
            let _ = writeln!(out, "  downstream.forwarded   {}", self.forwarded);
            let _ = writeln!(out, "  downstream.retired     {}", self.retired);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("backpressure") {
            let pct = |n: u64| (n as f64 / cyc) * 100.0;
            let _ = writeln!(out, "BACKPRESSURE");
            let _ = writeln!(
                out,
                "  stall.tracker_full     {} ({:.2}%)",
                self.stalls_tracker_full,
                pct(self.stalls_tracker_full)
            );
            let _ = writeln!(
                out,
                "  stall.buffer_full      {} ({:.2}%)",
                self.stalls_buffer_full,
                pct(self.stalls_buffer_full)
            );
            let _ = writeln!(
                out,
                "  stall.downstream       {} ({:.2}%)",
                self.stalls_downstream_not_ready,
                pct(self.stalls_downstream_not_ready)
            );
            let _ = writeln!(
                out,
                "  stall.arbitration      {} ({:.2}%)",
                self.arbitration_conflicts,
                pct(self.arbitration_conflicts)
            );
            let _ = writeln!(
                out,
                "  retire.held            {} ({:.2}%)",
                self.retire_backpressure,
                pct(self.retire_backpressure)
            );
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        out
    }

    /// Prints only the requested statistics sections to stdout.
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.report(sections));
    }
}
