//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     [[backends]] config → backend.rs (BackendRegistry, immutable)
//!     balancer.strategy   → Strategy::build → Arc<dyn BackendSelector>
//!
//! Per forwarded message:
//!     relay → selector.select()
//!         - round_robin.rs (rotate through backends)
//!         - random.rs (uniform pick)
//!     → &Backend to dial
//! ```
//!
//! # Design Decisions
//! - Registry is read-only after startup; only selector state is mutated
//! - Selector state lives behind a mutex owned by the selector
//! - Strategy is chosen once at startup, never swapped at runtime

pub mod backend;
pub mod random;
pub mod round_robin;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use backend::{Backend, BackendRegistry, RegistryError};
pub use random::Random;
pub use round_robin::RoundRobin;

/// Picks the backend for the next forwarded message.
///
/// Implementations must be callable from any number of relays at once and
/// block only for their own internal critical section.
pub trait BackendSelector: Send + Sync + fmt::Debug {
    fn select(&self) -> &Backend;
}

/// Selection algorithm, chosen from configuration at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
pub enum Strategy {
    #[default]
    #[serde(rename = "roundrobin", alias = "round-robin")]
    #[value(name = "roundrobin", alias = "round-robin")]
    RoundRobin,
    #[serde(rename = "random")]
    #[value(name = "random")]
    Random,
}

impl Strategy {
    /// Instantiate the selector for this strategy over `registry`.
    pub fn build(self, registry: BackendRegistry) -> Arc<dyn BackendSelector> {
        match self {
            Strategy::RoundRobin => Arc::new(RoundRobin::new(registry)),
            Strategy::Random => Arc::new(Random::new(registry)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::RoundRobin => f.write_str("roundrobin"),
            Strategy::Random => f.write_str("random"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BackendRegistry {
        BackendRegistry::new(vec![
            Backend::new("a", "127.0.0.1:1236"),
            Backend::new("b", "127.0.0.1:1237"),
        ])
        .unwrap()
    }

    #[test]
    fn strategy_builds_matching_selector() {
        let rr = Strategy::RoundRobin.build(registry());
        assert!(format!("{:?}", rr).starts_with("RoundRobin"));

        let random = Strategy::Random.build(registry());
        assert!(format!("{:?}", random).starts_with("Random"));
    }

    #[test]
    fn strategy_parses_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: Strategy,
        }

        let w: Wrapper = toml::from_str(r#"strategy = "round-robin""#).unwrap();
        assert_eq!(w.strategy, Strategy::RoundRobin);
        let w: Wrapper = toml::from_str(r#"strategy = "random""#).unwrap();
        assert_eq!(w.strategy, Strategy::Random);
        assert!(toml::from_str::<Wrapper>(r#"strategy = "least-conn""#).is_err());
    }

    #[test]
    fn strategy_display_matches_config_name() {
        assert_eq!(Strategy::RoundRobin.to_string(), "roundrobin");
        assert_eq!(Strategy::Random.to_string(), "random");
    }
}
