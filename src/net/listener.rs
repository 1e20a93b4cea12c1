//! TCP listener and accept loop.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections and wrap them as jobs
//! - Hand each job to the admission policy, waiting while it is saturated
//! - Surface bind/accept failures as fatal, distinct from per-connection errors

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::admission::{Admission, Job};
use crate::observability::metrics;

/// Error type for listener operations. Both variants are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// Inbound TCP listener.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to `address` (`host:port`; port 0 picks a free port).
    pub async fn bind(address: &str) -> Result<Self, ListenerError> {
        let bind_error = |source| ListenerError::Bind {
            address: address.to_string(),
            source,
        };

        let inner = TcpListener::bind(address).await.map_err(bind_error)?;
        let local_addr = inner.local_addr().map_err(bind_error)?;

        tracing::info!(address = %local_addr, "Listener bound");
        Ok(Self { inner })
    }

    /// Accept one connection.
    pub async fn accept(&self) -> Result<Job, ListenerError> {
        let (stream, peer) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        let job = Job::new(stream, peer);

        metrics::record_accepted();
        tracing::debug!(connection_id = %job.id, peer_addr = %peer, "Connection accepted");
        Ok(job)
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Accept connections forever, handing each one to `admission`.
    ///
    /// The next `accept` only happens once `admit` has returned, so a
    /// saturated admission policy stalls acceptance. Rejected connections are
    /// logged and do not stop the loop; only an accept failure does.
    pub async fn serve<A: Admission>(&self, admission: &A) -> Result<(), ListenerError> {
        loop {
            let job = self.accept().await?;
            if let Err(e) = admission.admit(job).await {
                metrics::record_admission_rejected();
                tracing::warn!(error = %e, "Connection rejected");
            }
        }
    }
}
