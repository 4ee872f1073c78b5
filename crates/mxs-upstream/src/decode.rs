//! Resource collection decoding.
//!
//! The API wraps every collection in `{"data": [...]}`. A body that is not
//! a JSON object, or whose `data` is present but not an array, is a
//! [`DecodeError`]; callers decide whether that fails anything. Within the
//! array, an element that cannot be read as a resource is skipped and the
//! rest of the collection survives.

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use tracing::warn;

use crate::error::DecodeError;
use crate::resource::{ResourceKind, ServerResource, ServiceResource};

/// Decode a collection body, preserving the upstream array order.
pub fn decode<T: DeserializeOwned>(
    kind: ResourceKind,
    body: &[u8],
) -> Result<Vec<T>, DecodeError> {
    let document: Value =
        serde_json::from_slice(body).map_err(|source| DecodeError { kind, source })?;
    let Value::Object(mut envelope) = document else {
        return Err(invalid(kind, "expected a JSON object at the top level"));
    };

    let elements = match envelope.remove("data") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(elements)) => elements,
        Some(_) => return Err(invalid(kind, "expected `data` to be an array")),
    };

    let resources = elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match serde_json::from_value::<T>(element) {
            Ok(resource) => Some(resource),
            Err(error) => {
                warn!(%kind, index, %error, "skipping undecodable resource");
                None
            }
        })
        .collect();
    Ok(resources)
}

fn invalid(kind: ResourceKind, reason: &str) -> DecodeError {
    DecodeError {
        kind,
        source: serde_json::Error::custom(reason),
    }
}

pub fn decode_servers(body: &[u8]) -> Result<Vec<ServerResource>, DecodeError> {
    decode(ResourceKind::Servers, body)
}

pub fn decode_services(body: &[u8]) -> Result<Vec<ServiceResource>, DecodeError> {
    decode(ResourceKind::Services, body)
}
