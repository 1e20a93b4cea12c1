//! Uniform random load balancing strategy.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::load_balancer::{Backend, BackendRegistry, BackendSelector};

/// Random selector.
/// Each call draws an index uniformly from `[0, len)`.
///
/// The RNG sits behind a mutex so this selector gives the same
/// synchronization guarantees as [`RoundRobin`](super::RoundRobin).
#[derive(Debug)]
pub struct Random {
    backends: BackendRegistry,
    rng: Mutex<StdRng>,
}

impl Random {
    pub fn new(backends: BackendRegistry) -> Self {
        Self::with_rng(backends, StdRng::from_entropy())
    }

    /// Deterministic selector for reproducible runs.
    pub fn with_seed(backends: BackendRegistry, seed: u64) -> Self {
        Self::with_rng(backends, StdRng::seed_from_u64(seed))
    }

    fn with_rng(backends: BackendRegistry, rng: StdRng) -> Self {
        Self {
            backends,
            rng: Mutex::new(rng),
        }
    }
}

impl BackendSelector for Random {
    fn select(&self) -> &Backend {
        let index = self
            .rng
            .lock()
            .expect("random selector mutex poisoned")
            .gen_range(0..self.backends.len());
        &self.backends[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    fn registry() -> BackendRegistry {
        BackendRegistry::new(vec![
            Backend::new("A", "127.0.0.1:1236"),
            Backend::new("B", "127.0.0.1:1237"),
            Backend::new("C", "127.0.0.1:1238"),
        ])
        .unwrap()
    }

    #[test]
    fn single_backend_always_selected() {
        let lb = Random::new(BackendRegistry::new(vec![Backend::new("only", "127.0.0.1:1")]).unwrap());
        for _ in 0..100 {
            assert_eq!(lb.select().name, "only");
        }
    }

    #[test]
    fn roughly_uniform_distribution() {
        let lb = Random::with_seed(registry(), 7);
        let samples = 30_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..samples {
            *counts.entry(lb.select().name.clone()).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        let expected = samples / 3;
        for (name, count) in counts {
            let deviation = (count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.05, "{} selected {} times (expected ~{})", name, count, expected);
        }
    }

    #[test]
    fn seeded_selectors_agree() {
        let a = Random::with_seed(registry(), 42);
        let b = Random::with_seed(registry(), 42);
        for _ in 0..50 {
            assert_eq!(a.select(), b.select());
        }
    }

    #[test]
    fn concurrent_selection_stays_in_registry() {
        let lb = Arc::new(Random::new(registry()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lb = lb.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let picked = lb.select();
                        assert!(["A", "B", "C"].contains(&picked.name.as_str()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
