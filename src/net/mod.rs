//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, fatal bind/accept errors)
//!     → connection.rs (connection id, active relay tracking)
//!     → admission (unbounded task or worker pool)
//!     → relay.rs (read → select → dial → forward → reply, per message)
//! ```
//!
//! # Design Decisions
//! - Accept stalls while admission is saturated; connections are never dropped
//! - Per-connection failures stay inside the relay; only listener errors are fatal

pub mod connection;
pub mod listener;
pub mod relay;

pub use connection::ConnectionId;
pub use listener::{Listener, ListenerError};
pub use relay::{Relay, RelayError, RelayStage};
