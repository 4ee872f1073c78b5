//! Metric descriptor tables.
//!
//! Each exported statistic is one row: the metric identity plus a reader
//! that pulls the value out of a decoded resource. Adding or removing a
//! statistic is a one-row edit.

use mxs_upstream::{ServerStatistics, ServiceAttributes};

/// Immutable identity of an exported metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub name: &'static str,
    pub help: &'static str,
    /// The single label every sample of this metric carries.
    pub label: &'static str,
}

/// How a field's value is obtained from a resource.
pub enum Reading<T> {
    /// Numeric statistic, exported as a gauge.
    Counter(fn(&T) -> u64),
    /// Textual statistic. Described, never emitted.
    Text,
}

/// One row of a descriptor table.
pub struct Field<T> {
    pub descriptor: Descriptor,
    pub reading: Reading<T>,
}

const fn counter<T>(
    name: &'static str,
    help: &'static str,
    label: &'static str,
    read: fn(&T) -> u64,
) -> Field<T> {
    Field {
        descriptor: Descriptor { name, help, label },
        reading: Reading::Counter(read),
    }
}

const fn text<T>(name: &'static str, help: &'static str, label: &'static str) -> Field<T> {
    Field {
        descriptor: Descriptor { name, help, label },
        reading: Reading::Text,
    }
}

const SERVER: &str = "server";
const SERVICE: &str = "service";

/// Server family: prefix `s_`, label `server`.
pub static SERVER_FIELDS: [Field<ServerStatistics>; 10] = [
    counter(
        "s_active_operations",
        "Number of operations currently active on the server.",
        SERVER,
        |s: &ServerStatistics| s.active_operations,
    ),
    // A duration string such as "1.23s"; exporting it would need unit parsing.
    text(
        "s_adaptive_avg_select_time",
        "Adaptive average SELECT time reported by the server (textual, not exported).",
        SERVER,
    ),
    counter(
        "s_connection_pool_empty",
        "Number of times the server's connection pool was empty.",
        SERVER,
        |s: &ServerStatistics| s.connection_pool_empty,
    ),
    counter(
        "s_connections",
        "Current number of connections to the server.",
        SERVER,
        |s: &ServerStatistics| s.connections,
    ),
    counter(
        "s_max_connections",
        "Maximum number of simultaneous connections to the server.",
        SERVER,
        |s: &ServerStatistics| s.max_connections,
    ),
    counter(
        "s_max_pool_size",
        "Maximum size of the server's connection pool.",
        SERVER,
        |s: &ServerStatistics| s.max_pool_size,
    ),
    counter(
        "s_persistent_connections",
        "Number of persistent connections to the server.",
        SERVER,
        |s: &ServerStatistics| s.persistent_connections,
    ),
    counter(
        "s_reused_connections",
        "Number of reused pooled connections to the server.",
        SERVER,
        |s: &ServerStatistics| s.reused_connections,
    ),
    counter(
        "s_routed_packets",
        "Number of packets routed to the server.",
        SERVER,
        |s: &ServerStatistics| s.routed_packets,
    ),
    counter(
        "s_total_connections",
        "Total number of connections made to the server.",
        SERVER,
        |s: &ServerStatistics| s.total_connections,
    ),
];

/// Service family: prefix `r_`, label `service`.
///
/// Router diagnostics first, then connection statistics.
pub static SERVICE_FIELDS: [Field<ServiceAttributes>; 12] = [
    counter(
        "r_queries",
        "Number of queries routed by the service.",
        SERVICE,
        |a: &ServiceAttributes| a.router_diagnostics.queries,
    ),
    counter(
        "r_replayed_transactions",
        "Number of transactions replayed by the service.",
        SERVICE,
        |a: &ServiceAttributes| a.router_diagnostics.replayed_transactions,
    ),
    counter(
        "r_ro_transactions",
        "Number of read-only transactions routed by the service.",
        SERVICE,
        |a: &ServiceAttributes| a.router_diagnostics.ro_transactions,
    ),
    counter(
        "r_route_all",
        "Number of queries routed to all servers.",
        SERVICE,
        |a: &ServiceAttributes| a.router_diagnostics.route_all,
    ),
    counter(
        "r_route_master",
        "Number of queries routed to the master.",
        SERVICE,
        |a: &ServiceAttributes| a.router_diagnostics.route_master,
    ),
    counter(
        "r_route_slave",
        "Number of queries routed to slaves.",
        SERVICE,
        |a: &ServiceAttributes| a.router_diagnostics.route_slave,
    ),
    counter(
        "r_rw_transactions",
        "Number of read-write transactions routed by the service.",
        SERVICE,
        |a: &ServiceAttributes| a.router_diagnostics.rw_transactions,
    ),
    counter(
        "r_active_operations",
        "Number of operations currently active on the service.",
        SERVICE,
        |a: &ServiceAttributes| a.statistics.active_operations,
    ),
    counter(
        "r_connections",
        "Current number of connections to the service.",
        SERVICE,
        |a: &ServiceAttributes| a.statistics.connections,
    ),
    counter(
        "r_max_connections",
        "Maximum number of simultaneous connections to the service.",
        SERVICE,
        |a: &ServiceAttributes| a.statistics.max_connections,
    ),
    counter(
        "r_routed_packets",
        "Number of packets routed by the service.",
        SERVICE,
        |a: &ServiceAttributes| a.statistics.routed_packets,
    ),
    counter(
        "r_total_connections",
        "Total number of connections made to the service.",
        SERVICE,
        |a: &ServiceAttributes| a.statistics.total_connections,
    ),
];

/// Exporter-level gauge: 1 when a resource kind was fetched and decoded.
pub static SCRAPE_SUCCESS: Descriptor = Descriptor {
    name: "mxs_exporter_scrape_success",
    help: "Whether the last scrape of a MaxScale resource kind succeeded (1) or failed (0).",
    label: "kind",
};
