//! Kernel-statistics (kstat) backed collectors.
//!
//! A kstat is addressed by `class:module:instance:name` and carries a set of
//! named counters. Reading them is delegated to a [`KstatReader`]; collectors
//! in this module only describe *which* statistics to read and how each one
//! maps to a metric.

mod cpu_info;

pub use cpu_info::CpuInfoCollector;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::collector::traits::ZoneInfo;
use crate::metric::{MetricRecord, MetricType, is_numeric_value};

/// Cache TTL shared by every kstat-backed collector.
pub const METRIC_TTL: Duration = Duration::from_secs(10);

/// Which instance of a kstat module to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KstatInstance {
    /// A fixed instance number.
    Fixed(i32),
    /// The instance named after the zone being collected for.
    Zone,
}

/// Static `class:module:instance` selector for one kstat family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KstatSelector {
    pub class: Cow<'static, str>,
    pub module: Cow<'static, str>,
    pub instance: KstatInstance,
}

impl KstatSelector {
    pub const fn new_static(
        class: &'static str,
        module: &'static str,
        instance: KstatInstance,
    ) -> Self {
        Self {
            class: Cow::Borrowed(class),
            module: Cow::Borrowed(module),
            instance,
        }
    }
}

impl fmt::Display for KstatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance {
            KstatInstance::Fixed(id) => write!(f, "{}:{}:{}", self.class, self.module, id),
            KstatInstance::Zone => write!(f, "{}:{}:<zone>", self.class, self.module),
        }
    }
}

/// Value of a single named statistic.
#[derive(Debug, Clone, PartialEq)]
pub enum KstatValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl fmt::Display for KstatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KstatValue::Int(v) => write!(f, "{}", v),
            KstatValue::UInt(v) => write!(f, "{}", v),
            KstatValue::Float(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "Infinity" } else { "-Infinity" })
            }
            KstatValue::Float(v) => write!(f, "{}", v),
            KstatValue::Str(v) => f.write_str(v),
        }
    }
}

/// One kstat as returned by a reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kstat {
    pub class: String,
    pub module: String,
    pub instance: i32,
    pub name: String,
    pub data: HashMap<String, KstatValue>,
}

impl Kstat {
    /// Whether this kstat is addressed by `selector`.
    ///
    /// An unresolved [`KstatInstance::Zone`] matches no instance.
    pub fn matches(&self, selector: &KstatSelector) -> bool {
        self.class == selector.class
            && self.module == selector.module
            && selector.instance == KstatInstance::Fixed(self.instance)
    }
}

/// Maps one named statistic to the metric it is exported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KstatMapping {
    pub kstat_key: &'static str,
    pub key: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

/// Error from reading or translating kstats.
#[derive(Debug, Error)]
pub enum KstatError {
    #[error("kstat read {selector} failed: {message}")]
    Read { selector: String, message: String },
    #[error("kstat {module}:{stat} is not numeric: [{value}]")]
    NonNumeric {
        module: String,
        stat: String,
        value: String,
    },
}

/// Reads kstats from the operating system.
///
/// Selectors handed to `read` always carry a resolved instance.
#[async_trait]
pub trait KstatReader: Send + Sync {
    async fn read(&self, selector: &KstatSelector) -> Result<Vec<Kstat>, KstatError>;
}

#[async_trait]
impl<R: KstatReader + ?Sized> KstatReader for Arc<R> {
    async fn read(&self, selector: &KstatSelector) -> Result<Vec<Kstat>, KstatError> {
        (**self).read(selector).await
    }
}

/// Resolves a static selector against the zone being collected for.
pub fn kstat_read_opts(zone: &ZoneInfo, selector: &KstatSelector) -> KstatSelector {
    let mut opts = selector.clone();
    if opts.instance == KstatInstance::Zone {
        opts.instance = KstatInstance::Fixed(zone.zone_id);
    }
    opts
}

/// Reads the kstats selected by `opts` and translates them through `map`.
///
/// Every (kstat, mapping) pair whose statistic is present yields one record,
/// in kstat order then mapping order. Statistics missing from a kstat are
/// skipped. Reader errors are returned unchanged.
pub async fn kstats_to_metrics<R: KstatReader + ?Sized>(
    map: &[KstatMapping],
    reader: &R,
    opts: &KstatSelector,
) -> Result<Vec<MetricRecord>, KstatError> {
    let kstats = reader.read(opts).await?;
    let mut metrics = Vec::new();

    for kstat in &kstats {
        for mapping in map {
            let Some(stat) = kstat.data.get(mapping.kstat_key) else {
                continue;
            };

            let value = stat.to_string();
            if !is_numeric_value(&value) {
                return Err(KstatError::NonNumeric {
                    module: kstat.module.clone(),
                    stat: mapping.kstat_key.to_string(),
                    value,
                });
            }

            metrics.push(MetricRecord {
                key: mapping.key.to_string(),
                metric_type: mapping.metric_type,
                value,
                help: mapping.help.to_string(),
                label: None,
            });
        }
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockKstatReader;

    const LINK_SELECTOR: KstatSelector =
        KstatSelector::new_static("net", "link", KstatInstance::Zone);

    const LINK_KSTATS: &[KstatMapping] = &[
        KstatMapping {
            kstat_key: "obytes64",
            key: "net_agg_bytes_out",
            metric_type: MetricType::Counter,
            help: "Aggregate outbound bytes",
        },
        KstatMapping {
            kstat_key: "rbytes64",
            key: "net_agg_bytes_in",
            metric_type: MetricType::Counter,
            help: "Aggregate inbound bytes",
        },
    ];

    fn link_kstat(instance: i32, obytes: u64, rbytes: Option<u64>) -> Kstat {
        let mut data = HashMap::new();
        data.insert("obytes64".to_string(), KstatValue::UInt(obytes));
        if let Some(r) = rbytes {
            data.insert("rbytes64".to_string(), KstatValue::UInt(r));
        }
        Kstat {
            class: "net".to_string(),
            module: "link".to_string(),
            instance,
            name: "vnic0".to_string(),
            data,
        }
    }

    #[test]
    fn test_kstat_read_opts_resolves_zone() {
        let zone = ZoneInfo::new(7, "web");
        let opts = kstat_read_opts(&zone, &LINK_SELECTOR);
        assert_eq!(opts.instance, KstatInstance::Fixed(7));
        assert_eq!(opts.class, "net");
        assert_eq!(opts.module, "link");
        // The static selector itself is untouched.
        assert_eq!(LINK_SELECTOR.instance, KstatInstance::Zone);
    }

    #[test]
    fn test_kstat_read_opts_keeps_fixed_instance() {
        let selector = KstatSelector::new_static("misc", "cpu_info", KstatInstance::Fixed(0));
        let opts = kstat_read_opts(&ZoneInfo::new(7, "web"), &selector);
        assert_eq!(opts, selector);
    }

    #[test]
    fn test_selector_display() {
        let selector = KstatSelector::new_static("misc", "cpu_info", KstatInstance::Fixed(3));
        assert_eq!(selector.to_string(), "misc:cpu_info:3");
        assert_eq!(LINK_SELECTOR.to_string(), "net:link:<zone>");
    }

    #[test]
    fn test_kstat_matches() {
        let kstat = link_kstat(7, 1, None);
        assert!(kstat.matches(&kstat_read_opts(&ZoneInfo::new(7, "web"), &LINK_SELECTOR)));
        assert!(!kstat.matches(&kstat_read_opts(&ZoneInfo::new(8, "db"), &LINK_SELECTOR)));
        assert!(!kstat.matches(&LINK_SELECTOR));
    }

    #[tokio::test]
    async fn test_kstats_to_metrics_maps_present_stats() {
        let mut reader = MockKstatReader::new();
        reader.add_kstat(link_kstat(7, 1000, Some(2000)));
        reader.add_kstat(link_kstat(7, 5, None));
        reader.add_kstat(link_kstat(8, 99, Some(99)));

        let opts = kstat_read_opts(&ZoneInfo::new(7, "web"), &LINK_SELECTOR);
        let metrics = kstats_to_metrics(LINK_KSTATS, &reader, &opts).await.unwrap();

        let values: Vec<(&str, &str)> = metrics
            .iter()
            .map(|m| (m.key.as_str(), m.value.as_str()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("net_agg_bytes_out", "1000"),
                ("net_agg_bytes_in", "2000"),
                ("net_agg_bytes_out", "5"),
            ]
        );
        assert_eq!(metrics[0].help, "Aggregate outbound bytes");
        assert_eq!(metrics[0].metric_type, MetricType::Counter);
    }

    #[tokio::test]
    async fn test_kstats_to_metrics_no_kstats() {
        let reader = MockKstatReader::new();
        let opts = kstat_read_opts(&ZoneInfo::new(7, "web"), &LINK_SELECTOR);
        let metrics = kstats_to_metrics(LINK_KSTATS, &reader, &opts).await.unwrap();
        assert!(metrics.is_empty());
    }

    #[tokio::test]
    async fn test_kstats_to_metrics_reader_error_relayed() {
        let reader = MockKstatReader::failing("permission denied");
        let opts = kstat_read_opts(&ZoneInfo::new(7, "web"), &LINK_SELECTOR);
        let err = kstats_to_metrics(LINK_KSTATS, &reader, &opts)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "kstat read net:link:7 failed: permission denied");
    }

    #[tokio::test]
    async fn test_kstats_to_metrics_rejects_non_numeric() {
        let mut kstat = link_kstat(7, 1, None);
        kstat
            .data
            .insert("rbytes64".to_string(), KstatValue::Str("n/a".to_string()));
        let mut reader = MockKstatReader::new();
        reader.add_kstat(kstat);

        let opts = kstat_read_opts(&ZoneInfo::new(7, "web"), &LINK_SELECTOR);
        let err = kstats_to_metrics(LINK_KSTATS, &reader, &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, KstatError::NonNumeric { ref stat, .. } if stat == "rbytes64"));
    }

    #[test]
    fn test_kstat_value_display() {
        assert_eq!(KstatValue::Int(-3).to_string(), "-3");
        assert_eq!(KstatValue::UInt(42).to_string(), "42");
        assert_eq!(KstatValue::Float(2.5).to_string(), "2.5");
        assert_eq!(KstatValue::Float(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(KstatValue::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(KstatValue::Str("85".to_string()).to_string(), "85");
    }
}
