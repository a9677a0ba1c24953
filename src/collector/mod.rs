//! Metric collectors.
//!
//! Every metric source implements [`Collector`]; an [`Aggregator`] holds a
//! list of them as trait objects and never sees concrete types.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Aggregator                          │
//! │        (Box<dyn Collector>, per-zone cache by cache_ttl)     │
//! └───────────────┬──────────────────────────────┬───────────────┘
//!                 │                              │
//!        ┌────────▼─────────┐           ┌────────▼─────────┐
//!        │ CpuInfoCollector │           │ PluginCollector  │
//!        │  (kstat adapter) │           │  parse output    │
//!        └────────┬─────────┘           └────────┬─────────┘
//!                 │                              │
//!          ┌──────▼──────┐               ┌───────▼────────┐
//!          │ KstatReader │ (trait)       │ PluginExecutor │ (trait)
//!          └──────┬──────┘               └───────┬────────┘
//!                 │                              │
//!        ┌────────┴─────────┐          ┌─────────┴────────┐
//!        │ OS reader        │          │ process runner   │
//!        │ MockKstatReader  │          │ MockExecutor     │
//!        └──────────────────┘          └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use hostmetrics::collector::{Aggregator, CollectContext, ZoneInfo};
//! use hostmetrics::collector::kstat::CpuInfoCollector;
//! use hostmetrics::collector::mock::MockKstatReader;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut aggregator = Aggregator::new();
//! let cpu_info = CpuInfoCollector::new(MockKstatReader::typical_host());
//! aggregator.register("cpu_info", Box::new(cpu_info));
//!
//! let metrics = aggregator.collect(&CollectContext::new(ZoneInfo::global())).await;
//! assert_eq!(metrics[0].key, "cpu_info_model");
//! # });
//! ```

mod aggregator;
pub mod kstat;
pub mod mock;
pub mod traits;

pub use aggregator::Aggregator;
pub use traits::{CollectContext, CollectError, Collector, GZ_ZONE_ID, ZoneInfo};
