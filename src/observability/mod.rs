//! Observability subsystem.
//!
//! Logging is plain `tracing`, initialized in `main`. This module carries
//! the metrics facade: a Prometheus exporter plus the handful of recording
//! helpers called from the proxy, the prober, and the reload signal.

pub mod metrics;
