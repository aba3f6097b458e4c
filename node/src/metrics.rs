//! Prometheus metrics for the ledger node.
//!
//! Exposes counters, gauges, and histograms covering chain-update
//! arbitration and commit activity. The [`NodeMetrics`] struct owns a
//! dedicated [`Registry`] that an exporter can encode into the Prometheus
//! text exposition format with [`NodeMetrics::encode_text`].

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Candidates taken off the update queue.
    pub candidates_received: IntCounter,
    /// Batches drained and arbitrated.
    pub batches_processed: IntCounter,
    /// Updates committed to the ledger.
    pub updates_committed: IntCounter,
    /// Candidates thrown away, failed or superseded.
    pub candidates_discarded: IntCounter,
    /// Batches in which no candidate succeeded.
    pub all_failed_batches: IntCounter,
    /// Commit side effects that returned an error.
    pub commit_step_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Height of the last committed tip.
    pub committed_height: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Candidates per drained batch.
    pub batch_size: Histogram,
    /// Time spent running the commit sequence, in milliseconds.
    pub commit_latency_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Counters
        let candidates_received = register_int_counter_with_registry!(
            Opts::new(
                "tessera_update_candidates_received_total",
                "Chain-update candidates received by the arbiter"
            ),
            registry
        )?;

        let batches_processed = register_int_counter_with_registry!(
            Opts::new(
                "tessera_update_batches_total",
                "Candidate batches arbitrated"
            ),
            registry
        )?;

        let updates_committed = register_int_counter_with_registry!(
            Opts::new(
                "tessera_updates_committed_total",
                "Chain updates committed to the ledger"
            ),
            registry
        )?;

        let candidates_discarded = register_int_counter_with_registry!(
            Opts::new(
                "tessera_update_candidates_discarded_total",
                "Candidates discarded as failed or superseded"
            ),
            registry
        )?;

        let all_failed_batches = register_int_counter_with_registry!(
            Opts::new(
                "tessera_update_batches_all_failed_total",
                "Batches in which every candidate failed"
            ),
            registry
        )?;

        let commit_step_failures = register_int_counter_with_registry!(
            Opts::new(
                "tessera_commit_step_failures_total",
                "Commit side effects that failed"
            ),
            registry
        )?;

        // Gauges
        let committed_height = register_int_gauge_with_registry!(
            Opts::new("tessera_committed_height", "Height of the committed tip"),
            registry
        )?;

        // Histograms
        let batch_size = register_histogram_with_registry!(
            HistogramOpts::new("tessera_update_batch_size", "Candidates per batch")
                .buckets(prometheus::exponential_buckets(1.0, 2.0, 8)?),
            registry
        )?;

        let commit_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "tessera_commit_latency_ms",
                "Commit sequence latency in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(0.1, 2.0, 15)?),
            registry
        )?;

        Ok(Self {
            registry,
            candidates_received,
            batches_processed,
            updates_committed,
            candidates_discarded,
            all_failed_batches,
            commit_step_failures,
            committed_height,
            batch_size,
            commit_latency_ms,
        })
    }

    /// Render every metric in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
