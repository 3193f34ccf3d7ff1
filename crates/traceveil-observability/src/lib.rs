//! TraceVeil Observability
//!
//! Structured logging setup and Prometheus metrics for the masking
//! pipeline.

pub mod metrics;
pub mod tracing;

pub use metrics::Metrics;
pub use tracing::{LoggingConfig, init_tracing};
