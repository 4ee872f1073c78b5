//! MaxScale resource collections as returned by `/v1/servers` and `/v1/services`.
//!
//! Every field tolerates absence and wrong JSON types by falling back to its
//! zero value, so one odd attribute never costs the whole collection.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The two upstream collection types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Servers,
    Services,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Servers, ResourceKind::Services];

    /// Path segment under `/v1/`.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Servers => "servers",
            ResourceKind::Services => "services",
        }
    }

    /// Name of the label that carries a resource ID for this kind.
    pub fn label_name(self) -> &'static str {
        match self {
            ResourceKind::Servers => "server",
            ResourceKind::Services => "service",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ── Servers ────────────────────────────────────────────────────

/// One entry of the `servers` collection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerResource {
    #[serde(deserialize_with = "text")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub attributes: ServerAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerAttributes {
    #[serde(deserialize_with = "lenient")]
    pub statistics: ServerStatistics,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerStatistics {
    #[serde(deserialize_with = "counter")]
    pub active_operations: u64,
    /// Reported as a duration string such as `"1.23s"`; kept as text.
    #[serde(deserialize_with = "optional_text")]
    pub adaptive_avg_select_time: Option<String>,
    #[serde(deserialize_with = "counter")]
    pub connection_pool_empty: u64,
    #[serde(deserialize_with = "counter")]
    pub connections: u64,
    #[serde(deserialize_with = "counter")]
    pub max_connections: u64,
    #[serde(deserialize_with = "counter")]
    pub max_pool_size: u64,
    #[serde(deserialize_with = "counter")]
    pub persistent_connections: u64,
    #[serde(deserialize_with = "counter")]
    pub reused_connections: u64,
    #[serde(deserialize_with = "counter")]
    pub routed_packets: u64,
    #[serde(deserialize_with = "counter")]
    pub total_connections: u64,
}

// ── Services ───────────────────────────────────────────────────

/// One entry of the `services` collection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceResource {
    #[serde(deserialize_with = "text")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub attributes: ServiceAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceAttributes {
    #[serde(deserialize_with = "lenient")]
    pub router_diagnostics: RouterDiagnostics,
    #[serde(deserialize_with = "lenient")]
    pub statistics: ServiceStatistics,
}

/// Query and transaction routing counters of a service's router.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouterDiagnostics {
    #[serde(deserialize_with = "counter")]
    pub queries: u64,
    #[serde(deserialize_with = "counter")]
    pub replayed_transactions: u64,
    #[serde(deserialize_with = "counter")]
    pub ro_transactions: u64,
    #[serde(deserialize_with = "counter")]
    pub route_all: u64,
    #[serde(deserialize_with = "counter")]
    pub route_master: u64,
    #[serde(deserialize_with = "counter")]
    pub route_slave: u64,
    #[serde(deserialize_with = "counter")]
    pub rw_transactions: u64,
}

/// Connection statistics of a service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceStatistics {
    #[serde(deserialize_with = "counter")]
    pub active_operations: u64,
    #[serde(deserialize_with = "counter")]
    pub connections: u64,
    #[serde(deserialize_with = "counter")]
    pub max_connections: u64,
    #[serde(deserialize_with = "counter")]
    pub routed_packets: u64,
    #[serde(deserialize_with = "counter")]
    pub total_connections: u64,
}

// ── Tolerant field decoding ────────────────────────────────────

/// Non-negative integer, or 0 for anything else.
fn counter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .unwrap_or(0),
        _ => 0,
    })
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Nested object that falls back to its default when it has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}
