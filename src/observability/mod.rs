//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / handlers produce:
//!     → logging.rs (structured events, request/response dumps, body taps)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
