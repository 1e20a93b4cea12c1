//! TCP forwarding load balancer library.

pub mod admission;
pub mod config;
pub mod load_balancer;
pub mod net;
pub mod observability;
pub mod resilience;

pub use admission::{Admission, Job, Unbounded, WorkerPool};
pub use config::BalancerConfig;
pub use load_balancer::{Backend, BackendRegistry, BackendSelector, Strategy};
pub use net::{Listener, Relay};
