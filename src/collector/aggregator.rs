//! Combines many collectors into one metric set.

use std::collections::HashMap;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::collector::traits::{CollectContext, Collector};
use crate::metric::MetricRecord;

/// Result of one successful `get_metrics` call, kept for the collector's TTL.
struct CachedMetrics {
    fetched_at: Instant,
    metrics: Vec<MetricRecord>,
}

struct Registered {
    name: String,
    collector: Box<dyn Collector>,
    /// Cached results keyed by zone id.
    cache: HashMap<i32, CachedMetrics>,
}

/// Runs a set of collectors and merges their output.
///
/// A collector is only invoked again for a zone once its previous result is
/// older than its `cache_ttl()`. A failing collector contributes nothing to
/// that cycle; the others are unaffected.
#[derive(Default)]
pub struct Aggregator {
    collectors: Vec<Registered>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collector. `name` is used for logging only.
    pub fn register(&mut self, name: impl Into<String>, collector: Box<dyn Collector>) {
        self.collectors.push(Registered {
            name: name.into(),
            collector,
            cache: HashMap::new(),
        });
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Collects from every registered collector, in registration order.
    pub async fn collect(&mut self, ctx: &CollectContext) -> Vec<MetricRecord> {
        let zone_id = ctx.zone.zone_id;
        let mut all = Vec::new();

        for entry in &mut self.collectors {
            let ttl = entry.collector.cache_ttl();

            // Expired results for any zone are dropped, not only this one.
            entry.cache.retain(|_, cached| cached.fetched_at.elapsed() < ttl);

            if let Some(cached) = entry.cache.get(&zone_id) {
                trace!(collector = %entry.name, zone = zone_id, "using cached metrics");
                all.extend(cached.metrics.iter().cloned());
                continue;
            }

            match entry.collector.get_metrics(ctx).await {
                Ok(metrics) => {
                    debug!(
                        collector = %entry.name,
                        zone = zone_id,
                        count = metrics.len(),
                        "collected metrics"
                    );
                    all.extend(metrics.iter().cloned());
                    entry.cache.insert(
                        zone_id,
                        CachedMetrics {
                            fetched_at: Instant::now(),
                            metrics,
                        },
                    );
                }
                Err(e) => {
                    warn!(
                        collector = %entry.name,
                        zone = zone_id,
                        error = %e,
                        "collector failed, skipping for this cycle"
                    );
                    entry.cache.remove(&zone_id);
                }
            }
        }

        all
    }
}
