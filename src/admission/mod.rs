//! Admission subsystem.
//!
//! # Data Flow
//! ```text
//! Listener accept → Job
//!     → Admission::admit(job)
//!         - unbounded.rs  (spawn one task per job)
//!         - worker_pool.rs (bounded queue → fixed workers)
//!     → Relay::handle(job)
//! ```
//!
//! # Design Decisions
//! - Policy is picked once at startup
//! - Every job is relayed by exactly one task, or rejected and closed
//! - The worker pool applies backpressure by blocking `admit`, never by dropping

pub mod unbounded;
pub mod worker_pool;

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpStream;

use crate::net::connection::ConnectionId;

pub use unbounded::Unbounded;
pub use worker_pool::WorkerPool;

/// One accepted client connection awaiting a relay.
#[derive(Debug)]
pub struct Job {
    pub id: ConnectionId,
    pub stream: TcpStream,
    pub peer: SocketAddr,
}

impl Job {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            stream,
            peer,
        }
    }
}

/// Error type for admission. The rejected connection has already been closed.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// No worker is left to drain the queue.
    #[error("worker queue closed; rejected {connection_id} from {peer}")]
    Closed {
        connection_id: ConnectionId,
        peer: SocketAddr,
    },
}

/// Policy deciding when and where an accepted connection is relayed.
pub trait Admission: Send + Sync {
    /// Hand `job` off for relaying.
    ///
    /// May wait for capacity; while it waits the listener does not accept.
    fn admit(&self, job: Job) -> impl Future<Output = Result<(), AdmissionError>> + Send;
}
