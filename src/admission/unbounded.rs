//! One task per connection, no upper bound.

use crate::admission::{Admission, AdmissionError, Job};
use crate::net::relay::Relay;

/// Spawns an independent relay task for every admitted connection.
#[derive(Debug, Clone)]
pub struct Unbounded {
    relay: Relay,
}

impl Unbounded {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }
}

impl Admission for Unbounded {
    async fn admit(&self, job: Job) -> Result<(), AdmissionError> {
        let relay = self.relay.clone();
        tokio::spawn(async move {
            let _ = relay.handle(job).await;
        });
        Ok(())
    }
}
