//! mxs-metrics — MaxScale statistics as Prometheus metrics.
//!
//! Maps decoded server and service resources onto static descriptor tables
//! and renders the result in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! Registry::gather()                      ← called per /metrics request
//!   ├── ServerCollector::collect()  → fetch servers  → SERVER_FIELDS  → Samples
//!   ├── ServiceCollector::collect() → fetch services → SERVICE_FIELDS → Samples
//!   └── mxs_exporter_scrape_success{kind}
//!
//! render_prometheus() → text/plain for /metrics endpoint
//! ```
//!
//! Samples live for one scrape only. A collector that fails (network,
//! timeout, non-2xx, undecodable body) contributes zero samples and a 0
//! status gauge; the other collector is unaffected.

pub mod collector;
pub mod descriptor;
pub mod prometheus;
pub mod registry;

pub use collector::{Collector, Sample, ScrapeError, ServerCollector, ServiceCollector};
pub use descriptor::{Descriptor, SCRAPE_SUCCESS, SERVER_FIELDS, SERVICE_FIELDS};
pub use prometheus::{CONTENT_TYPE, render_prometheus};
pub use registry::{MetricFamily, Registry};
