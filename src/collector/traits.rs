//! The contract shared by every metric source.
//!
//! Kernel-statistics readers and external plugins look nothing alike, but an
//! aggregator only ever sees them through [`Collector`].

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::collector::kstat::KstatError;
use crate::metric::MetricRecord;
use crate::plugin::ParseError;

/// Zone id of the global zone.
pub const GZ_ZONE_ID: i32 = 0;

/// Identifies the zone (container) metrics are collected on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneInfo {
    pub zone_id: i32,
    pub name: String,
}

impl ZoneInfo {
    pub fn new(zone_id: i32, name: impl Into<String>) -> Self {
        Self {
            zone_id,
            name: name.into(),
        }
    }

    /// The global zone.
    pub fn global() -> Self {
        Self::new(GZ_ZONE_ID, "global")
    }
}

/// Per-call context handed to [`Collector::get_metrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectContext {
    pub zone: ZoneInfo,
}

impl CollectContext {
    pub fn new(zone: ZoneInfo) -> Self {
        Self { zone }
    }
}

/// Error returned by a collector. Upstream failures are relayed unchanged.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Kernel-statistics read or translation failed.
    #[error(transparent)]
    Kstat(#[from] KstatError),
    /// Plugin output failed validation.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Plugin could not be run or did not finish.
    #[error("plugin {path} failed: {source}")]
    Plugin {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// A source of metrics.
///
/// `get_metrics` produces exactly one outcome per call: every record, or an
/// error and no records. Implementations keep no metrics between calls and
/// perform no retries.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Collects the current metrics for the target in `ctx`.
    async fn get_metrics(&self, ctx: &CollectContext) -> Result<Vec<MetricRecord>, CollectError>;

    /// How long a returned metric set stays valid.
    ///
    /// Callers must not invoke `get_metrics` again for the same target
    /// before this much time has passed.
    fn cache_ttl(&self) -> Duration;
}
