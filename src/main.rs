//! TCP forwarding load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌───────────────────────────────────────────────────────┐
//!                   │                    TCP BALANCER                        │
//!                   │                                                        │
//!   Client ─────────┼─▶ ┌──────────┐    ┌───────────┐    ┌──────────┐        │
//!                   │   │ listener │───▶│ admission │───▶│  relay   │────────┼──▶ Backend
//!   Client ◀────────┼── └──────────┘    │ pool/task │    │ per msg  │◀───────┼─── (dial per
//!                   │                   └───────────┘    └────┬─────┘        │     message)
//!                   │                                         │              │
//!                   │                                         ▼              │
//!                   │                                  ┌──────────────┐      │
//!                   │                                  │load_balancer │      │
//!                   │                                  │ rr / random  │      │
//!                   │                                  └──────────────┘      │
//!                   └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use tcp_balancer::admission::{Unbounded, WorkerPool};
use tcp_balancer::config::{
    read_config, validate_config, AdmissionMode, BackendConfig, BalancerConfig, ConfigError,
};
use tcp_balancer::load_balancer::{BackendRegistry, Strategy};
use tcp_balancer::net::{Listener, Relay};
use tcp_balancer::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "tcp-balancer")]
#[command(about = "TCP forwarding load balancer", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend selection algorithm.
    #[arg(short, long, value_enum)]
    algo: Option<Strategy>,

    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    bind: Option<String>,

    /// Admission policy.
    #[arg(long, value_enum)]
    admission: Option<AdmissionMode>,

    /// Worker count for the worker pool.
    #[arg(long)]
    workers: Option<usize>,

    /// Pending connection queue size for the worker pool.
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Backend address (host:port); repeat to list several. Replaces configured backends.
    #[arg(long = "backend", value_name = "ADDR")]
    backends: Vec<String>,
}

impl Cli {
    fn apply(&self, config: &mut BalancerConfig) {
        if let Some(strategy) = self.algo {
            config.balancer.strategy = strategy;
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(mode) = self.admission {
            config.admission.mode = mode;
        }
        if let Some(workers) = self.workers {
            config.admission.workers = workers;
        }
        if let Some(capacity) = self.queue_capacity {
            config.admission.queue_capacity = capacity;
        }
        if !self.backends.is_empty() {
            config.backends = self.backends.iter().cloned().map(BackendConfig::from_address).collect();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => BalancerConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("tcp-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = BackendRegistry::from_config(&config.backends)?;
    tracing::info!(
        strategy = %config.balancer.strategy,
        admission = %config.admission.mode,
        backends = ?registry.iter().map(|b| b.addr.as_str()).collect::<Vec<_>>(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let selector = config.balancer.strategy.build(registry);
    let relay = Relay::from_config(selector, &config);
    let listener = Listener::bind(&config.listener.bind_address).await?;

    let served = match config.admission.mode {
        AdmissionMode::Unbounded => listener.serve(&Unbounded::new(relay)).await,
        AdmissionMode::WorkerPool => {
            let pool = WorkerPool::spawn(relay, config.admission.workers, config.admission.queue_capacity);
            listener.serve(&pool).await
        }
    };

    if let Err(e) = served {
        tracing::error!(error = %e, "Listener failed");
        return Err(e.into());
    }
    Ok(())
}
