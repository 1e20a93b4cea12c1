//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! listener, admission, relay
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Connection id and peer flow through every relay log line
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
