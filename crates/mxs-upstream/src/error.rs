//! Error types for talking to the MaxScale REST API.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::resource::ResourceKind;

/// Boxed transport error from the HTTP stack.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while loading or validating the exporter configuration.
///
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by a single fetch against the upstream API.
///
/// These fail the affected resource kind for one scrape only.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream {url} unavailable: {source}")]
    Unavailable { url: String, source: BoxError },

    #[error("upstream {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("upstream {url} returned {status}")]
    Status {
        url: String,
        status: http::StatusCode,
    },

    #[error("cannot build request: {0}")]
    Request(String),
}

/// A response body that is not a decodable resource collection.
#[derive(Debug, Error)]
#[error("cannot decode {kind} response: {source}")]
pub struct DecodeError {
    pub kind: ResourceKind,
    pub source: serde_json::Error,
}
