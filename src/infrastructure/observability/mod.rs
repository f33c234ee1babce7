//! Push-based observability for mailpulse
//!
//! Metrics leave the process as outbound data only:
//!
//! 1. **Structured JSON Logs**: periodic JSON output to stdout
//! 2. **Prometheus text format**: rendered on demand from the registry

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
