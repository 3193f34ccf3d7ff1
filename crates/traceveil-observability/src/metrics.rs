//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for TraceVeil:
//! - File pipeline outcomes
//! - Candidate and mapping counts by category
//! - Scan duration histograms

use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for TraceVeil
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Files completed or failed, labeled by outcome
    pub files_processed: CounterVec,

    /// Masking candidates surviving exception filtering and overlap
    /// resolution, labeled by category
    pub candidates_found: CounterVec,

    /// New mappings created in the store, labeled by category
    pub mappings_created: CounterVec,

    /// Candidates suppressed by exception patterns
    pub candidates_suppressed: CounterVec,

    /// Whole-file scan duration
    pub scan_duration_seconds: Histogram,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let files_processed = CounterVec::new(
            Opts::new("traceveil_files_processed_total", "Files run through the pipeline"),
            &["outcome"],
        )?;

        let candidates_found = CounterVec::new(
            Opts::new(
                "traceveil_candidates_found_total",
                "Masking candidates surviving filtering",
            ),
            &["category"],
        )?;

        let mappings_created = CounterVec::new(
            Opts::new(
                "traceveil_mappings_created_total",
                "New mappings created in the store",
            ),
            &["category"],
        )?;

        let candidates_suppressed = CounterVec::new(
            Opts::new(
                "traceveil_candidates_suppressed_total",
                "Candidates suppressed by exception patterns",
            ),
            &["category"],
        )?;

        let scan_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "traceveil_scan_duration_seconds",
            "Whole-file scan duration",
        ))?;

        registry.register(Box::new(files_processed.clone()))?;
        registry.register(Box::new(candidates_found.clone()))?;
        registry.register(Box::new(mappings_created.clone()))?;
        registry.register(Box::new(candidates_suppressed.clone()))?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            files_processed,
            candidates_found,
            mappings_created,
            candidates_suppressed,
            scan_duration_seconds,
        })
    }

    /// Gather all metrics in the Prometheus text exposition format
    pub fn gather(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }

        String::from_utf8(buffer).unwrap_or_default()
    }
}
