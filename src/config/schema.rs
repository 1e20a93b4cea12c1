//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::load_balancer::Strategy;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend selection settings.
    pub balancer: SelectionConfig,

    /// How accepted connections are scheduled onto relays.
    pub admission: AdmissionConfig,

    /// Per-connection relay settings.
    pub relay: RelayConfig,

    /// Optional deadlines for backend dials and socket I/O.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Backend server definitions, in selection order.
    pub backends: Vec<BackendConfig>,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            balancer: SelectionConfig::default(),
            admission: AdmissionConfig::default(),
            relay: RelayConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            backends: default_backends(),
        }
    }
}

fn default_backends() -> Vec<BackendConfig> {
    (1..=3)
        .map(|i| BackendConfig {
            name: format!("server-{}", i),
            address: format!("127.0.0.1:{}", 1235 + i),
        })
        .collect()
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend selection configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Selection algorithm ("roundrobin" or "random").
    pub strategy: Strategy,
}

/// Admission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AdmissionMode {
    /// One task per accepted connection, no upper bound.
    Unbounded,
    /// Fixed set of workers draining a bounded queue.
    #[default]
    WorkerPool,
}

impl std::fmt::Display for AdmissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdmissionMode::Unbounded => f.write_str("unbounded"),
            AdmissionMode::WorkerPool => f.write_str("worker-pool"),
        }
    }
}

/// Admission configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdmissionConfig {
    pub mode: AdmissionMode,

    /// Number of long-lived workers (worker-pool mode).
    pub workers: usize,

    /// Pending connections held before accept stalls (worker-pool mode).
    pub queue_capacity: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            mode: AdmissionMode::WorkerPool,
            workers: 3,
            queue_capacity: 10,
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Size of the single read performed on each side per message.
    pub buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { buffer_size: 1024 }
    }
}

/// Timeout configuration. Unset values mean no deadline.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend dial timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Per read/write timeout in seconds, on both client and backend sockets.
    pub io_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Option<Duration> {
        self.connect_secs.map(Duration::from_secs)
    }

    pub fn io(&self) -> Option<Duration> {
        self.io_secs.map(Duration::from_secs)
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BackendConfig {
    /// Backend identifier used in logs and metrics.
    pub name: String,

    /// Backend address (e.g., "127.0.0.1:1236").
    pub address: String,
}

impl BackendConfig {
    /// Backend entry named after its address.
    pub fn from_address(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            name: address.clone(),
            address,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
