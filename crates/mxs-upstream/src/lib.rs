//! mxs-upstream — access to the MaxScale administrative REST API.
//!
//! Loads the exporter configuration, fetches resource collections over
//! authenticated HTTP, and decodes them into typed resources.
//!
//! # Architecture
//!
//! ```text
//! UpstreamConfig::from_file() → UpstreamConfig
//!   └── UpstreamClient::new(&config, timeout)
//!         └── fetch(ResourceKind) → Bytes      (ResourceFetcher)
//!               └── decode_servers() / decode_services() → Vec<Resource>
//! ```
//!
//! Decoding is tolerant at the field level: absent or wrongly-typed
//! statistics become zero. Only a body that is not a JSON collection at all
//! yields a [`DecodeError`].

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod resource;

pub use client::{BoxFuture, DEFAULT_TIMEOUT, ResourceFetcher, UpstreamClient};
pub use config::UpstreamConfig;
pub use decode::{decode, decode_servers, decode_services};
pub use error::{ConfigError, DecodeError, UpstreamError};
pub use resource::*;
