//! Fixed worker pool fed by a bounded queue.
//!
//! # Responsibilities
//! - Spawn `workers` long-lived tasks sharing one job queue
//! - Run each dequeued job's relay to completion before taking the next
//! - Block `admit` while the queue is full (backpressure on accept)

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::admission::{Admission, AdmissionError, Job};
use crate::net::relay::Relay;
use crate::observability::metrics;

/// Worker pool admission policy.
///
/// With `K` workers and queue capacity `C`, up to `K` connections are being
/// relayed and `C` more are waiting; the next `admit` blocks until a worker
/// frees a slot.
#[derive(Debug)]
pub struct WorkerPool {
    tx: mpsc::Sender<Job>,
    workers: usize,
}

impl WorkerPool {
    /// Spawn `workers` tasks draining a queue of `queue_capacity` jobs.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Panics
    /// Panics if `workers` or `queue_capacity` is zero.
    pub fn spawn(relay: Relay, workers: usize, queue_capacity: usize) -> Self {
        assert!(workers > 0, "worker pool needs at least one worker");
        let (tx, rx) = mpsc::channel(queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        for id in 0..workers {
            tokio::spawn(run_worker(id, relay.clone(), rx.clone()));
        }

        tracing::info!(workers, queue_capacity, "Worker pool started");
        Self { tx, workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Jobs waiting in the queue (not yet picked up by a worker).
    pub fn queue_len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn queue_capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

impl Admission for WorkerPool {
    async fn admit(&self, job: Job) -> Result<(), AdmissionError> {
        if self.tx.capacity() == 0 {
            tracing::debug!(
                connection_id = %job.id,
                queue_capacity = self.queue_capacity(),
                "Worker queue full, waiting for a free slot"
            );
        }

        match self.tx.send(job).await {
            Ok(()) => {
                metrics::set_queue_depth(self.queue_len());
                Ok(())
            }
            Err(mpsc::error::SendError(job)) => Err(AdmissionError::Closed {
                connection_id: job.id,
                peer: job.peer,
            }),
        }
    }
}

async fn run_worker(id: usize, relay: Relay, queue: Arc<Mutex<mpsc::Receiver<Job>>>) {
    tracing::debug!(worker = id, "Worker started");
    loop {
        // The lock is released before the relay runs so other idle workers
        // can keep dequeuing.
        let next = queue.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        tracing::debug!(worker = id, connection_id = %job.id, peer = %job.peer, "Worker picked up connection");
        let _ = relay.handle(job).await;
    }
    tracing::debug!(worker = id, "Worker queue closed, exiting");
}
