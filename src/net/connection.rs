//! Connection identity and relay tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Count relays currently in progress

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::observability::metrics;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an accepted client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Counts relays in progress. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RelayTracker {
    active_count: Arc<AtomicU64>,
}

impl RelayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a relay as started. The returned guard records it as finished on drop.
    pub fn track(&self, id: ConnectionId) -> RelayGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        metrics::relay_started();
        RelayGuard {
            active_count: Arc::clone(&self.active_count),
            id,
        }
    }

    /// Get current number of relays in progress.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Guard spanning one relay's lifetime.
#[derive(Debug)]
pub struct RelayGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl RelayGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for RelayGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        metrics::relay_finished();
        tracing::trace!(connection_id = %self.id, "Relay finished");
    }
}
