//! Exporter configuration file parser.
//!
//! The file is a small JSON document:
//!
//! ```json
//! { "username": "admin", "password": "mariadb", "host": "http://127.0.0.1", "port": 8989 }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Credentials and location of the MaxScale REST API.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl UpstreamConfig {
    /// Read, parse, and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: UpstreamConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a client cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be 0".to_string()));
        }
        if let Some((scheme, _)) = host.split_once("://") {
            if !scheme.eq_ignore_ascii_case("http") {
                return Err(ConfigError::Invalid(format!(
                    "unsupported scheme {scheme:?} in host; only http is supported"
                )));
            }
        }
        Ok(())
    }

    /// Base URL of the API, e.g. `http://127.0.0.1:8989`.
    ///
    /// A host without a scheme is treated as plain http.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.contains("://") {
            format!("{host}:{}", self.port)
        } else {
            format!("http://{host}:{}", self.port)
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
