//! Per-scrape collectors.
//!
//! A collector fetches one resource kind, decodes it, and walks every
//! resource against its descriptor table. Nothing is kept between calls:
//! each `collect()` is a fresh upstream round-trip.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use mxs_upstream::{
    BoxFuture, DecodeError, ResourceFetcher, ResourceKind, ServerResource, ServerStatistics,
    ServiceAttributes, ServiceResource, UpstreamError,
};

use crate::descriptor::{Descriptor, Field, Reading, SERVER_FIELDS, SERVICE_FIELDS};

/// One value of one metric for one resource, valid for a single scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub descriptor: &'static Descriptor,
    pub label_value: String,
    pub value: f64,
}

/// Why a collector produced nothing for its resource kind.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Describe/collect contract between a collector and the exposition sink.
pub trait Collector: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Every descriptor this collector may emit, identical on every call.
    fn describe(&self) -> Vec<&'static Descriptor>;

    /// Fetch, decode, and map the resource kind into samples.
    fn collect(&self) -> BoxFuture<'_, Result<Vec<Sample>, ScrapeError>>;
}

/// A decoded resource that maps onto a descriptor table.
pub trait MetricSource: DeserializeOwned + Send + 'static {
    type Stats: 'static;

    const KIND: ResourceKind;

    fn fields() -> &'static [Field<Self::Stats>];

    fn id(&self) -> &str;

    fn stats(&self) -> &Self::Stats;
}

impl MetricSource for ServerResource {
    type Stats = ServerStatistics;

    const KIND: ResourceKind = ResourceKind::Servers;

    fn fields() -> &'static [Field<ServerStatistics>] {
        &SERVER_FIELDS
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stats(&self) -> &ServerStatistics {
        &self.attributes.statistics
    }
}

impl MetricSource for ServiceResource {
    type Stats = ServiceAttributes;

    const KIND: ResourceKind = ResourceKind::Services;

    fn fields() -> &'static [Field<ServiceAttributes>] {
        &SERVICE_FIELDS
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stats(&self) -> &ServiceAttributes {
        &self.attributes
    }
}

/// Lazily map decoded resources to samples.
///
/// One sample per numeric descriptor per resource; textual fields are
/// skipped. A resource ID seen twice in one response is emitted once.
pub fn samples<R: MetricSource>(resources: &[R]) -> impl Iterator<Item = Sample> + '_ {
    let mut seen: HashSet<String> = HashSet::new();
    resources
        .iter()
        .filter(move |r| {
            let first = seen.insert(r.id().to_string());
            if !first {
                warn!(kind = %R::KIND, id = r.id(), "duplicate resource id in upstream response");
            }
            first
        })
        .flat_map(|r| {
            R::fields().iter().filter_map(move |field| match field.reading {
                Reading::Counter(read) => Some(Sample {
                    descriptor: &field.descriptor,
                    label_value: r.id().to_string(),
                    value: read(r.stats()) as f64,
                }),
                Reading::Text => None,
            })
        })
}

/// Table-driven collector for one resource kind.
pub struct ResourceCollector<R> {
    fetcher: Arc<dyn ResourceFetcher>,
    _resource: PhantomData<fn() -> R>,
}

pub type ServerCollector = ResourceCollector<ServerResource>;
pub type ServiceCollector = ResourceCollector<ServiceResource>;

impl<R: MetricSource> ResourceCollector<R> {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            fetcher,
            _resource: PhantomData,
        }
    }
}

impl<R: MetricSource> Collector for ResourceCollector<R> {
    fn kind(&self) -> ResourceKind {
        R::KIND
    }

    fn describe(&self) -> Vec<&'static Descriptor> {
        R::fields().iter().map(|f| &f.descriptor).collect()
    }

    fn collect(&self) -> BoxFuture<'_, Result<Vec<Sample>, ScrapeError>> {
        Box::pin(async move {
            let body = self.fetcher.fetch(R::KIND).await?;
            let resources: Vec<R> = mxs_upstream::decode(R::KIND, &body)?;
            let samples: Vec<Sample> = samples(&resources).collect();
            debug!(
                kind = %R::KIND,
                resources = resources.len(),
                samples = samples.len(),
                "collected"
            );
            Ok(samples)
        })
    }
}
