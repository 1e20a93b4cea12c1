//! Round-robin load balancing strategy.

use std::sync::Mutex;

use crate::load_balancer::{Backend, BackendRegistry, BackendSelector};

/// Round-robin selector.
///
/// The cursor always indexes into the registry. Reading the backend and
/// advancing the cursor happen under a single lock acquisition.
#[derive(Debug)]
pub struct RoundRobin {
    backends: BackendRegistry,
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new(backends: BackendRegistry) -> Self {
        Self {
            backends,
            cursor: Mutex::new(0),
        }
    }

    /// Index the next `select` call will return.
    pub fn cursor(&self) -> usize {
        *self.cursor.lock().expect("round-robin cursor mutex poisoned")
    }
}

impl BackendSelector for RoundRobin {
    fn select(&self) -> &Backend {
        let mut cursor = self.cursor.lock().expect("round-robin cursor mutex poisoned");
        let backend = &self.backends[*cursor];
        *cursor = (*cursor + 1) % self.backends.len();
        backend
    }
}
