//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Hold the ordered, immutable set of backends for the process lifetime

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::config::BackendConfig;

/// Error type for registry construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No backends were configured.
    #[error("backend registry is empty; at least one backend is required")]
    Empty,
}

/// A single backend server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// Name used in logs and metric labels.
    pub name: String,
    /// Dial address (`host:port`).
    pub addr: String,
}

impl Backend {
    /// Create a new backend.
    pub fn new(name: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
        }
    }
}

impl From<&BackendConfig> for Backend {
    fn from(config: &BackendConfig) -> Self {
        Self::new(config.name.clone(), config.address.clone())
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.addr)
    }
}

/// Ordered, fixed list of backends.
///
/// Built once at startup and shared by cloning; there is no mutation API, so
/// readers never need to synchronize.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    backends: Arc<[Backend]>,
}

impl BackendRegistry {
    /// Build a registry, rejecting an empty backend list.
    pub fn new(backends: Vec<Backend>) -> Result<Self, RegistryError> {
        if backends.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self {
            backends: backends.into(),
        })
    }

    /// Build a registry from backend configuration entries.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, RegistryError> {
        Self::new(configs.iter().map(Backend::from).collect())
    }

    /// Number of backends. Never zero.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Backend> {
        self.backends.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Backend> {
        self.backends.iter()
    }

    pub fn as_slice(&self) -> &[Backend] {
        &self.backends
    }
}

impl Index<usize> for BackendRegistry {
    type Output = Backend;

    fn index(&self, index: usize) -> &Self::Output {
        &self.backends[index]
    }
}

impl<'a> IntoIterator for &'a BackendRegistry {
    type Item = &'a Backend;
    type IntoIter = std::slice::Iter<'a, Backend>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_rejected() {
        assert_eq!(BackendRegistry::new(Vec::new()).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn registry_preserves_order() {
        let registry = BackendRegistry::new(vec![
            Backend::new("a", "127.0.0.1:1236"),
            Backend::new("b", "127.0.0.1:1237"),
            Backend::new("c", "127.0.0.1:1238"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 3);
        let names: Vec<&str> = registry.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(registry[1].addr, "127.0.0.1:1237");
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn clones_share_storage() {
        let registry = BackendRegistry::new(vec![Backend::new("a", "127.0.0.1:1236")]).unwrap();
        let clone = registry.clone();
        assert!(std::ptr::eq(registry.as_slice(), clone.as_slice()));
    }
}
