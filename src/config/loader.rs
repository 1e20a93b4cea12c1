//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read a TOML file without semantic validation, for callers that layer
/// overrides on top before validating.
pub fn read_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BalancerConfig, ConfigError> {
    let config: BalancerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdmissionMode;
    use crate::load_balancer::Strategy;

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.balancer.strategy, Strategy::RoundRobin);
        assert_eq!(config.admission.mode, AdmissionMode::WorkerPool);
        assert_eq!(config.backends.len(), 3);
        assert_eq!(config.backends[0].address, "127.0.0.1:1236");
        assert_eq!(config.backends[2].address, "127.0.0.1:1238");
        assert_eq!(config.relay.buffer_size, 1024);
        assert!(config.timeouts.connect().is_none());
    }

    #[test]
    fn full_document() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [balancer]
            strategy = "random"

            [admission]
            mode = "unbounded"
            workers = 8
            queue_capacity = 64

            [relay]
            buffer_size = 4096

            [timeouts]
            connect_secs = 2
            io_secs = 10

            [[backends]]
            name = "alpha"
            address = "10.0.0.1:7000"

            [[backends]]
            name = "beta"
            address = "10.0.0.2:7000"
            "#,
        )
        .unwrap();

        assert_eq!(config.balancer.strategy, Strategy::Random);
        assert_eq!(config.admission.mode, AdmissionMode::Unbounded);
        assert_eq!(config.admission.workers, 8);
        assert_eq!(config.relay.buffer_size, 4096);
        assert_eq!(config.timeouts.connect(), Some(std::time::Duration::from_secs(2)));
        let names: Vec<&str> = config.backends.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }

    #[test]
    fn example_config_is_valid() {
        let config = parse_config(include_str!("../../balancer.example.toml")).unwrap();
        assert_eq!(config.backends.len(), 3);
        assert_eq!(config.admission.workers, 3);
    }

    #[test]
    fn explicit_empty_backend_list_is_fatal() {
        let err = parse_config("backends = []").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &[ValidationError::NoBackends]));
        assert!(err.to_string().contains("no backends configured"));
    }

    #[test]
    fn unknown_strategy_is_parse_error() {
        let err = parse_config("[balancer]\nstrategy = \"least-conn\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("tcp-balancer-{}.toml", std::process::id()));
        fs::write(&path, "[balancer]\nstrategy = \"random\"\n").unwrap();
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.balancer.strategy, Strategy::Random);
    }

    #[test]
    fn read_config_defers_validation() {
        let path = std::env::temp_dir().join(format!("tcp-balancer-empty-{}.toml", std::process::id()));
        fs::write(&path, "backends = []\n").unwrap();
        let read = read_config(&path);
        let loaded = load_config(&path);
        fs::remove_file(&path).unwrap();

        assert!(read.unwrap().backends.is_empty());
        assert!(matches!(loaded, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/tcp-balancer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
