//! Per-connection relay.
//!
//! # State Machine
//! ```text
//! AwaitClientData → SelectingBackend → DialingBackend → Forwarding
//!     → AwaitingBackendReply → ReplyingToClient → AwaitClientData (loop)
//!
//! Any failure, or client EOF in AwaitClientData → Closed
//! ```
//!
//! Each message is a single bounded read from the client. The backend is
//! selected and dialed anew for every message and its socket is closed once
//! the reply has been read. There is no retry and no failover.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::Instrument;

use crate::admission::Job;
use crate::config::BalancerConfig;
use crate::load_balancer::{Backend, BackendSelector};
use crate::net::connection::RelayTracker;
use crate::observability::metrics;
use crate::resilience::io_deadline;

/// Default size of the single read performed on each side per message.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Relay step at which a session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayStage {
    AwaitClientData,
    DialingBackend,
    Forwarding,
    AwaitingBackendReply,
    ReplyingToClient,
}

impl RelayStage {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayStage::AwaitClientData => "client_read",
            RelayStage::DialingBackend => "backend_dial",
            RelayStage::Forwarding => "backend_write",
            RelayStage::AwaitingBackendReply => "backend_read",
            RelayStage::ReplyingToClient => "client_write",
        }
    }
}

impl fmt::Display for RelayStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-connection failure. Terminates only the affected session.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to read from client: {0}")]
    ClientRead(#[source] io::Error),

    #[error("failed to connect to backend {backend}: {source}")]
    Dial {
        backend: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to send to backend {backend}: {source}")]
    BackendWrite {
        backend: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to receive from backend {backend}: {source}")]
    BackendRead {
        backend: String,
        #[source]
        source: io::Error,
    },

    #[error("backend {backend} closed the connection without replying")]
    BackendClosed { backend: String },

    #[error("failed to send to client: {0}")]
    ClientWrite(#[source] io::Error),
}

impl RelayError {
    /// The step that failed.
    pub fn stage(&self) -> RelayStage {
        match self {
            RelayError::ClientRead(_) => RelayStage::AwaitClientData,
            RelayError::Dial { .. } => RelayStage::DialingBackend,
            RelayError::BackendWrite { .. } => RelayStage::Forwarding,
            RelayError::BackendRead { .. } | RelayError::BackendClosed { .. } => {
                RelayStage::AwaitingBackendReply
            }
            RelayError::ClientWrite(_) => RelayStage::ReplyingToClient,
        }
    }

    /// True when the failure was an expired deadline.
    pub fn is_timeout(&self) -> bool {
        let source = match self {
            RelayError::ClientRead(e) | RelayError::ClientWrite(e) => e,
            RelayError::Dial { source, .. }
            | RelayError::BackendWrite { source, .. }
            | RelayError::BackendRead { source, .. } => source,
            RelayError::BackendClosed { .. } => return false,
        };
        source.kind() == io::ErrorKind::TimedOut
    }
}

/// Forwards client messages to backends chosen by a [`BackendSelector`].
///
/// Cheap to clone; clones share the selector and the active-relay tracker.
#[derive(Debug, Clone)]
pub struct Relay {
    selector: Arc<dyn BackendSelector>,
    buffer_size: usize,
    connect_timeout: Option<Duration>,
    io_timeout: Option<Duration>,
    tracker: RelayTracker,
}

impl Relay {
    /// Relay with the default buffer size and no deadlines.
    pub fn new(selector: Arc<dyn BackendSelector>) -> Self {
        Self {
            selector,
            buffer_size: DEFAULT_BUFFER_SIZE,
            connect_timeout: None,
            io_timeout: None,
            tracker: RelayTracker::new(),
        }
    }

    /// Relay configured from the `[relay]` and `[timeouts]` sections.
    pub fn from_config(selector: Arc<dyn BackendSelector>, config: &BalancerConfig) -> Self {
        Self::new(selector)
            .with_buffer_size(config.relay.buffer_size)
            .with_timeouts(config.timeouts.connect(), config.timeouts.io())
    }

    /// # Panics
    /// Panics if `size` is zero.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        assert!(size > 0, "relay buffer size must be non-zero");
        self.buffer_size = size;
        self
    }

    pub fn with_timeouts(mut self, connect: Option<Duration>, io: Option<Duration>) -> Self {
        self.connect_timeout = connect;
        self.io_timeout = io;
        self
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Relays currently in progress across all clones.
    pub fn active_relays(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Run the relay for one accepted connection, logging and counting the
    /// outcome. The client socket is closed when this returns.
    pub async fn handle(&self, job: Job) -> Result<u64, RelayError> {
        let Job { id, stream, peer } = job;
        let _guard = self.tracker.track(id);
        let span = tracing::debug_span!("relay", connection_id = %id, peer = %peer);

        let result = self.relay(stream).instrument(span).await;
        match &result {
            Ok(messages) => {
                tracing::debug!(connection_id = %id, peer = %peer, messages, "Client closed connection");
            }
            Err(e) => {
                metrics::record_relay_failure(e.stage());
                tracing::warn!(
                    connection_id = %id,
                    peer = %peer,
                    stage = %e.stage(),
                    timeout = e.is_timeout(),
                    error = %e,
                    "Relay failed, closing client connection"
                );
            }
        }
        result
    }

    /// Drive the relay loop over `client` until it closes or a step fails.
    ///
    /// Returns the number of messages relayed when the client ends the
    /// session with EOF. `client` is dropped, and so closed, on every path.
    pub async fn relay<S>(&self, mut client: S) -> Result<u64, RelayError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut request = vec![0u8; self.buffer_size];
        let mut reply = vec![0u8; self.buffer_size];
        let mut relayed = 0u64;

        loop {
            let received = io_deadline(self.io_timeout, client.read(&mut request))
                .await
                .map_err(RelayError::ClientRead)?;
            if received == 0 {
                return Ok(relayed);
            }
            tracing::trace!(
                bytes = received,
                payload = %String::from_utf8_lossy(&request[..received]),
                "Received from client"
            );

            let backend = self.selector.select();
            let replied = self.exchange(backend, &request[..received], &mut reply).await?;

            io_deadline(self.io_timeout, client.write_all(&reply[..replied]))
                .await
                .map_err(RelayError::ClientWrite)?;

            relayed += 1;
            metrics::record_message(&backend.name);
            tracing::debug!(
                backend = %backend.addr,
                request_bytes = received,
                reply_bytes = replied,
                "Message relayed"
            );
        }
    }

    /// One dial-write-read round trip against `backend`.
    /// Returns the number of reply bytes placed in `reply`.
    async fn exchange(&self, backend: &Backend, payload: &[u8], reply: &mut [u8]) -> Result<usize, RelayError> {
        let mut upstream = io_deadline(self.connect_timeout, TcpStream::connect(backend.addr.as_str()))
            .await
            .map_err(|source| RelayError::Dial {
                backend: backend.addr.clone(),
                source,
            })?;

        io_deadline(self.io_timeout, upstream.write_all(payload))
            .await
            .map_err(|source| RelayError::BackendWrite {
                backend: backend.addr.clone(),
                source,
            })?;

        let read = io_deadline(self.io_timeout, upstream.read(reply))
            .await
            .map_err(|source| RelayError::BackendRead {
                backend: backend.addr.clone(),
                source,
            })?;
        if read == 0 {
            return Err(RelayError::BackendClosed {
                backend: backend.addr.clone(),
            });
        }
        Ok(read)
    }
}
