//! Client configuration.
//!
//! Built in code or loaded from a TOML file:
//!
//! ```toml
//! service_url = "memory://local"
//! io_threads = 2
//!
//! [embedded]
//! auto_create_topics = false
//!
//! [[embedded.topics]]
//! name = "orders"
//! partitions = 4
//! ```

use std::path::{Path, PathBuf};

use blocking_client::EmbeddedConfig;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Scheme served by the in-process client.
pub const MEMORY_SCHEME: &str = "memory://";

const NATIVE_SCHEMES: [&str; 2] = ["pulsar://", "pulsar+ssl://"];

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service URL (`memory://`, `pulsar://` or `pulsar+ssl://`).
    pub service_url: String,
    /// Threads delivering completion callbacks (default: 1).
    #[serde(default = "default_io_threads")]
    pub io_threads: usize,
    /// Token presented to the service.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Settings for the in-process broker behind `memory://`.
    #[serde(default)]
    pub embedded: EmbeddedConfig,
}

fn default_io_threads() -> usize {
    1
}

impl ClientConfig {
    /// Config for `service_url` with everything else defaulted.
    pub fn new(service_url: &str) -> Self {
        Self {
            service_url: service_url.to_string(),
            io_threads: default_io_threads(),
            auth_token: None,
            embedded: EmbeddedConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Whether this config selects the in-process client.
    pub fn is_embedded(&self) -> bool {
        self.service_url.starts_with(MEMORY_SCHEME)
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - service_url is empty
    /// - service_url has an unsupported scheme
    /// - io_threads is 0
    pub fn validate(&self) -> Result<(), BridgeError> {
        let url = self.service_url.trim();
        if url.is_empty() {
            return Err(BridgeError::InvalidConfig(
                "service_url must not be empty".to_string(),
            ));
        }

        let supported = url.starts_with(MEMORY_SCHEME)
            || NATIVE_SCHEMES.iter().any(|scheme| url.starts_with(scheme));
        if !supported {
            return Err(BridgeError::InvalidConfig(format!(
                "unsupported service_url '{url}' (expected memory://, pulsar:// or pulsar+ssl://)"
            )));
        }

        if self.io_threads == 0 {
            return Err(BridgeError::InvalidConfig(
                "io_threads must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn new_uses_defaults() {
        let config = ClientConfig::new("memory://local");
        assert_eq!(config.io_threads, 1);
        assert!(config.auth_token.is_none());
        assert!(config.embedded.auto_create_topics);
        assert!(config.is_embedded());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
service_url = "memory://test"
io_threads = 4
auth_token = "secret"

[embedded]
auto_create_topics = false
auth_token = "secret"

[[embedded.topics]]
name = "orders"
partitions = 2
"#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.io_threads, 4);
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert!(!config.embedded.auto_create_topics);
        assert_eq!(config.embedded.topics[0].name, "orders");
        assert_eq!(config.embedded.topics[0].partitions, 2);
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(r#"service_url = "pulsar://localhost:6650""#)
            .unwrap();
        assert_eq!(config, ClientConfig::new("pulsar://localhost:6650"));
    }

    #[test]
    fn empty_url_rejected() {
        let err = ClientConfig::new("  ").validate().unwrap_err();
        assert!(err.to_string().contains("service_url must not be empty"));
    }

    #[test]
    fn unsupported_scheme_rejected() {
        let err = ClientConfig::new("http://localhost").validate().unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
    }

    #[test]
    fn native_schemes_validate() {
        for url in ["pulsar://localhost:6650", "pulsar+ssl://broker:6651"] {
            assert!(ClientConfig::new(url).validate().is_ok());
        }
    }

    #[test]
    fn zero_io_threads_rejected() {
        let config = ClientConfig {
            io_threads: 0,
            ..ClientConfig::new("memory://")
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("io_threads"));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service_url = \"memory://file\"\nio_threads = 3").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.service_url, "memory://file");
        assert_eq!(config.io_threads, 3);
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn from_file_garbage_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "io_threads = [").unwrap();
        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
