//! CPU information from the `misc:cpu_info` kstats.

use std::time::Duration;

use async_trait::async_trait;

use super::{KstatInstance, KstatMapping, KstatReader, KstatSelector, METRIC_TTL};
use super::{kstat_read_opts, kstats_to_metrics};
use crate::collector::traits::{CollectContext, CollectError, Collector, GZ_ZONE_ID};
use crate::metric::{MetricRecord, MetricType};

const CPU_INFO_READ_OPTS: KstatSelector =
    KstatSelector::new_static("misc", "cpu_info", KstatInstance::Fixed(GZ_ZONE_ID));

const CPU_INFO_KSTATS: &[KstatMapping] = &[KstatMapping {
    kstat_key: "model",
    key: "cpu_info_model",
    metric_type: MetricType::Gauge,
    help: "CPU model",
}];

/// Exposes the `misc:cpu_info` kstats as a [`Collector`].
pub struct CpuInfoCollector<R: KstatReader> {
    reader: R,
    read_opts: KstatSelector,
}

impl<R: KstatReader> CpuInfoCollector<R> {
    /// Creates a collector reading through `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            read_opts: CPU_INFO_READ_OPTS,
        }
    }
}

#[async_trait]
impl<R: KstatReader> Collector for CpuInfoCollector<R> {
    async fn get_metrics(&self, ctx: &CollectContext) -> Result<Vec<MetricRecord>, CollectError> {
        let opts = kstat_read_opts(&ctx.zone, &self.read_opts);
        Ok(kstats_to_metrics(CPU_INFO_KSTATS, &self.reader, &opts).await?)
    }

    fn cache_ttl(&self) -> Duration {
        METRIC_TTL
    }
}
