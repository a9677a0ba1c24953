//! The normalized metric record and the validation rules every record obeys.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::trim_text;

/// Kind of a metric.
///
/// `Option` metrics describe static configuration values rather than time
/// series, so source prefixes are never applied to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Counter,
    Gauge,
    Option,
}

impl MetricType {
    /// Parses the wire name of a metric type (`counter`, `gauge`, `option`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "counter" => Some(MetricType::Counter),
            "gauge" => Some(MetricType::Gauge),
            "option" => Some(MetricType::Option),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Option => "option",
        }
    }

    /// Whether a source-specific name prefix applies to this type.
    pub fn is_prefixed(&self) -> bool {
        !matches!(self, MetricType::Option)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized measurement.
///
/// A record only exists once its key passed [`is_valid_metric_name`] and its
/// value passed [`is_numeric_value`]. The value keeps its original textual
/// form; int vs float interpretation belongs to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub key: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub value: String,
    pub help: String,
    /// Raw label set, e.g. `{interface="vnic0"}`, carried verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl fmt::Display for MetricRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}{} {}", self.key, label, self.value),
            None => write!(f, "{} {}", self.key, self.value),
        }
    }
}

/// Checks a metric name against `^[a-zA-Z_:][a-zA-Z0-9_:]*$`.
///
/// These are the exposition format's own naming rules, so anything accepted
/// here is never rejected further downstream.
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Checks that a value string is a number.
///
/// Surrounding whitespace is ignored and a blank value counts as zero.
/// Accepted forms:
/// - signed decimals with optional fraction and exponent (`-1.5e3`, `.5`)
/// - unsigned `0x`, `0o` and `0b` integer literals
/// - `Infinity`, `+Infinity`, `-Infinity`, spelled exactly so
///
/// Anything else, NaN and lowercase `inf` included, is rejected.
pub fn is_numeric_value(value: &str) -> bool {
    let value = trim_text(value);
    if value.is_empty() || matches!(value, "Infinity" | "+Infinity" | "-Infinity") {
        return true;
    }

    let radix = match value.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &value[2..];
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }

    value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && value.parse::<f64>().is_ok()
}

/// Splits a trailing label block off a metric name.
///
/// `net_agg_bytes_out{interface="vnic0"}` becomes
/// `("net_agg_bytes_out", Some("{interface=\"vnic0\"}"))`. The split only
/// happens when a non-empty bare name is followed by a `{...}` block that
/// closes the name and contains at least one `=`; otherwise the name is
/// returned untouched. The label block itself is not validated.
pub fn split_label(name: &str) -> (&str, Option<&str>) {
    let Some(open) = name.find('{') else {
        return (name, None);
    };
    if open == 0 {
        return (name, None);
    }

    let label = &name[open..];
    if label.len() < 2 || !label.ends_with('}') {
        return (name, None);
    }
    if !label[1..label.len() - 1].contains('=') {
        return (name, None);
    }

    (&name[..open], Some(label))
}
