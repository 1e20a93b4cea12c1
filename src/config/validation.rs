//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes > 0, ports valid, timeouts non-zero)
//! - Reject an empty backend list before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::BalancerConfig;

/// Largest accepted relay buffer.
pub const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("backend '{name}' has invalid address '{address}': expected host:port")]
    InvalidBackendAddress { name: String, address: String },

    #[error("invalid listener bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("admission.workers must be at least 1")]
    ZeroWorkers,

    #[error("admission.queue_capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("relay.buffer_size must be between 1 and {max}, got {got}")]
    BufferSize { got: usize, max: usize },

    #[error("timeouts.{0} must be greater than zero when set")]
    ZeroTimeout(&'static str),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for backend in &config.backends {
        if !is_host_port(&backend.address) {
            errors.push(ValidationError::InvalidBackendAddress {
                name: backend.name.clone(),
                address: backend.address.clone(),
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    if config.admission.workers == 0 {
        errors.push(ValidationError::ZeroWorkers);
    }
    if config.admission.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }

    let buffer_size = config.relay.buffer_size;
    if buffer_size == 0 || buffer_size > MAX_BUFFER_SIZE {
        errors.push(ValidationError::BufferSize {
            got: buffer_size,
            max: MAX_BUFFER_SIZE,
        });
    }

    if config.timeouts.connect_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.io_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("io_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a non-empty host and a non-zero port.
/// Bracketed IPv6 literals (`[::1]:80`) are accepted.
fn is_host_port(address: &str) -> bool {
    let Some((host, port)) = address.rsplit_once(':') else {
        return false;
    };
    let host_ok = if let Some(inner) = host.strip_prefix('[') {
        inner.strip_suffix(']').is_some_and(|h| !h.is_empty())
    } else {
        !host.is_empty() && !host.contains(':')
    };
    host_ok && matches!(port.parse::<u16>(), Ok(p) if p != 0)
}
