//! hostmetrics - metric normalization layer of the host telemetry agent.
//!
//! This library turns heterogeneous measurement sources into validated
//! [`MetricRecord`]s:
//! - `metric` - the normalized record and its validation rules
//! - `plugin` - plugin output parsing (tab-separated and exposition formats)
//! - `collector` - the `Collector` trait, kstat-backed collectors, aggregation
//! - `util` - helper utilities

pub mod collector;
pub mod metric;
pub mod plugin;
pub mod util;

pub use collector::{CollectContext, CollectError, Collector, ZoneInfo};
pub use metric::{MetricRecord, MetricType};
pub use plugin::{OutputFormat, ParseError, PluginOutputParser};
