//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Relay step (dial, read, write):
//!     → timeouts.rs (optional deadline)
//!     → On failure: session closed, no retry, no failover
//! ```

pub mod timeouts;

pub use timeouts::io_deadline;
