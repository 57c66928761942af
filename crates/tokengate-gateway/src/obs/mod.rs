//! Lightweight in-process metrics.
//!
//! Counters for authorization verdicts and reload outcomes, a gauge for the
//! size of the published snapshot, and a reload duration histogram. Rendered
//! in Prometheus text format by the `/metrics` handler.

pub mod metrics;

pub use metrics::AuthMetrics;
