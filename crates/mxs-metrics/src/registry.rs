//! Scrape registry — runs every collector once per scrape.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use mxs_upstream::ResourceFetcher;

use crate::collector::{Collector, Sample, ServerCollector, ServiceCollector};
use crate::descriptor::{Descriptor, SCRAPE_SUCCESS};

/// All samples of one metric gathered in one scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub descriptor: &'static Descriptor,
    /// `(label value, value)` pairs.
    pub samples: Vec<(String, f64)>,
}

/// The set of collectors behind the `/metrics` endpoint.
///
/// Holds no per-scrape state; concurrent scrapes share it read-only.
pub struct Registry {
    collectors: Vec<Box<dyn Collector>>,
}

impl Registry {
    /// Registry with the server and service collectors, in that order.
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self::with_collectors(vec![
            Box::new(ServerCollector::new(fetcher.clone())),
            Box::new(ServiceCollector::new(fetcher)),
        ])
    }

    pub fn with_collectors(collectors: Vec<Box<dyn Collector>>) -> Self {
        Self { collectors }
    }

    /// Every descriptor the registry can expose, including the scrape status gauge.
    pub fn describe(&self) -> Vec<&'static Descriptor> {
        let mut descriptors: Vec<&'static Descriptor> = self
            .collectors
            .iter()
            .flat_map(|c| c.describe())
            .collect();
        descriptors.push(&SCRAPE_SUCCESS);
        descriptors
    }

    /// Run one scrape.
    ///
    /// A collector that fails contributes no samples and a 0 status; the
    /// others are unaffected.
    pub async fn gather(&self) -> Vec<MetricFamily> {
        let results = join_all(self.collectors.iter().map(|c| c.collect())).await;

        let mut families = Vec::new();
        let mut status = MetricFamily {
            descriptor: &SCRAPE_SUCCESS,
            samples: Vec::with_capacity(self.collectors.len()),
        };

        for (collector, result) in self.collectors.iter().zip(results) {
            let kind = collector.kind();
            let samples = match result {
                Ok(samples) => {
                    status.samples.push((kind.to_string(), 1.0));
                    samples
                }
                Err(e) => {
                    warn!(%kind, error = %e, "scrape failed; exposing no samples for this kind");
                    status.samples.push((kind.to_string(), 0.0));
                    Vec::new()
                }
            };
            families.extend(group(collector.describe(), samples));
        }

        families.push(status);
        debug!(families = families.len(), "scrape gathered");
        families
    }

    #[cfg(test)]
    fn kinds(&self) -> Vec<mxs_upstream::ResourceKind> {
        self.collectors.iter().map(|c| c.kind()).collect()
    }
}

/// Group samples under their descriptors, in descriptor order.
fn group(descriptors: Vec<&'static Descriptor>, samples: Vec<Sample>) -> Vec<MetricFamily> {
    let mut families: Vec<MetricFamily> = descriptors
        .into_iter()
        .map(|descriptor| MetricFamily {
            descriptor,
            samples: Vec::new(),
        })
        .collect();

    for sample in samples {
        if let Some(family) = families
            .iter_mut()
            .find(|f| f.descriptor.name == sample.descriptor.name)
        {
            family.samples.push((sample.label_value, sample.value));
        }
    }
    families
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxs_upstream::ResourceKind;

    use crate::collector::tests::{SERVERS, SERVICES, StaticFetcher};

    fn registry(fetcher: StaticFetcher) -> Registry {
        Registry::new(Arc::new(fetcher))
    }

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.descriptor.name == name)
            .unwrap_or_else(|| panic!("no family {name}"))
    }

    fn sample_count(families: &[MetricFamily]) -> usize {
        families
            .iter()
            .filter(|f| f.descriptor.name != SCRAPE_SUCCESS.name)
            .map(|f| f.samples.len())
            .sum()
    }

    #[test]
    fn describe_covers_both_families() {
        let registry = registry(StaticFetcher::default());
        let descriptors = registry.describe();
        assert_eq!(descriptors.len(), 10 + 12 + 1);
        assert_eq!(descriptors, registry.describe());
        assert_eq!(registry.kinds(), ResourceKind::ALL);
    }

    #[tokio::test]
    async fn gather_both_kinds() {
        let registry = registry(
            StaticFetcher::default()
                .with(ResourceKind::Servers, SERVERS)
                .with(ResourceKind::Services, SERVICES),
        );
        let families = registry.gather().await;

        assert_eq!(sample_count(&families), 2 * 9 + 12);
        assert_eq!(
            family(&families, "s_connections").samples,
            vec![("srv1".to_string(), 5.0), ("srv2".to_string(), 7.0)]
        );
        assert!(family(&families, "s_adaptive_avg_select_time").samples.is_empty());
        assert_eq!(
            family(&families, SCRAPE_SUCCESS.name).samples,
            vec![("servers".to_string(), 1.0), ("services".to_string(), 1.0)]
        );
    }

    #[tokio::test]
    async fn failed_kind_is_isolated() {
        let registry = registry(StaticFetcher::default().with(ResourceKind::Services, SERVICES));
        let families = registry.gather().await;

        assert_eq!(sample_count(&families), 12);
        assert!(family(&families, "s_connections").samples.is_empty());
        assert_eq!(
            family(&families, SCRAPE_SUCCESS.name).samples,
            vec![("servers".to_string(), 0.0), ("services".to_string(), 1.0)]
        );
    }

    #[tokio::test]
    async fn malformed_kind_is_isolated() {
        let registry = registry(
            StaticFetcher::default()
                .with(ResourceKind::Servers, SERVERS)
                .with(ResourceKind::Services, "not json"),
        );
        let families = registry.gather().await;

        assert_eq!(sample_count(&families), 18);
        assert_eq!(
            family(&families, SCRAPE_SUCCESS.name).samples[1],
            ("services".to_string(), 0.0)
        );
    }

    #[tokio::test]
    async fn repeated_scrapes_are_equal() {
        let registry = registry(
            StaticFetcher::default()
                .with(ResourceKind::Servers, SERVERS)
                .with(ResourceKind::Services, SERVICES),
        );
        assert_eq!(registry.gather().await, registry.gather().await);
    }
}
