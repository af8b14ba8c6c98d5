//! Prometheus-compatible metrics exporter for tiker-trust
//!
//! Endpoint: GET /metrics (on the API port, default 8087)

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::engine::TrustEngine;

/// Request counters updated from the HTTP handlers
pub struct MetricsCounters {
    /// Single-agent trust lookups
    pub trust_requests: AtomicU64,
    /// Trust lookups for unknown agents
    pub trust_not_found: AtomicU64,
    pub leaderboard_requests: AtomicU64,
    /// Trust reports computed, across both call sites
    pub reports_computed: AtomicU64,
    /// Trust score buckets of computed reports: 0-19, 20-39, ..., 80-100
    pub score_buckets: [AtomicU64; 5],
    pub start_time: Instant,
}

impl MetricsCounters {
    pub fn new() -> Self {
        Self {
            trust_requests: AtomicU64::new(0),
            trust_not_found: AtomicU64::new(0),
            leaderboard_requests: AtomicU64::new(0),
            reports_computed: AtomicU64::new(0),
            score_buckets: Default::default(),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn record_report(&self, trust_score: u8) {
        self.reports_computed.fetch_add(1, Ordering::Relaxed);
        let bucket = (trust_score as usize / 20).min(4);
        self.score_buckets[bucket].fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MetricsCounters {
    fn default() -> Self {
        Self::new()
    }
}

const BUCKET_LABELS: [&str; 5] = ["0-19", "20-39", "40-59", "60-79", "80-100"];

/// Generate Prometheus-format metrics text
pub fn render_metrics(engine: &TrustEngine) -> String {
    let mut out = String::with_capacity(2048);
    let c = &engine.metrics;

    write_help_type(&mut out, "tiker_trust_up", "Whether the trust service is up.", "gauge");
    writeln!(out, "tiker_trust_up 1").ok();

    write_help_type(&mut out, "tiker_trust_uptime_seconds", "Seconds since the service started.", "gauge");
    writeln!(out, "tiker_trust_uptime_seconds {:.3}", c.start_time.elapsed().as_secs_f64()).ok();

    // ──────────────────────────────────────────────
    // Requests
    // ──────────────────────────────────────────────
    write_help_type(&mut out, "tiker_trust_requests_total", "Single-agent trust lookups.", "counter");
    writeln!(out, "tiker_trust_requests_total {}", c.trust_requests.load(Ordering::Relaxed)).ok();

    write_help_type(&mut out, "tiker_trust_not_found_total", "Trust lookups for unknown agents.", "counter");
    writeln!(out, "tiker_trust_not_found_total {}", c.trust_not_found.load(Ordering::Relaxed)).ok();

    write_help_type(&mut out, "tiker_leaderboard_requests_total", "Leaderboard requests.", "counter");
    writeln!(out, "tiker_leaderboard_requests_total {}", c.leaderboard_requests.load(Ordering::Relaxed)).ok();

    // ──────────────────────────────────────────────
    // Scores
    // ──────────────────────────────────────────────
    write_help_type(&mut out, "tiker_reports_computed_total", "Trust reports computed.", "counter");
    writeln!(out, "tiker_reports_computed_total {}", c.reports_computed.load(Ordering::Relaxed)).ok();

    write_help_type(&mut out, "tiker_report_score_total", "Computed reports by trust score band.", "counter");
    for (label, bucket) in BUCKET_LABELS.iter().zip(c.score_buckets.iter()) {
        write_counter_if_nonzero(&mut out, "tiker_report_score_total", "band", label, bucket.load(Ordering::Relaxed));
    }

    // ──────────────────────────────────────────────
    // Store
    // ──────────────────────────────────────────────
    let stats = engine.store.get_stats();
    for (key, name, help) in [
        ("agents", "tiker_store_agents", "Agents in the store."),
        ("contributions", "tiker_store_contributions", "Contributions in the store."),
        ("assessments", "tiker_store_assessments", "Assessments in the ledger."),
    ] {
        write_help_type(&mut out, name, help, "gauge");
        writeln!(out, "{} {}", name, stats[key].as_u64().unwrap_or(0)).ok();
    }

    write_help_type(&mut out, "tiker_trust_build_info", "tiker-trust build information.", "gauge");
    writeln!(out, "tiker_trust_build_info{{version=\"{}\"}} 1", env!("CARGO_PKG_VERSION")).ok();

    out
}

// ── helpers ─────────────────────────────────────────

fn write_help_type(out: &mut String, name: &str, help: &str, metric_type: &str) {
    writeln!(out, "# HELP {} {}", name, help).ok();
    writeln!(out, "# TYPE {} {}", name, metric_type).ok();
}

fn write_counter_if_nonzero(out: &mut String, name: &str, label: &str, value: &str, count: u64) {
    if count > 0 {
        writeln!(out, "{}{{{}=\"{}\"}} {}", name, label, value, count).ok();
    }
}
