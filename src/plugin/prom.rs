//! Parser for the standard single-line text exposition format.
//!
//! Supported subset:
//!
//! ```text
//! # HELP <name> <help text>
//! # TYPE <name> counter|gauge
//! <name>[{<labels>}] <value> [<timestamp>]
//! ```
//!
//! Samples without a `# TYPE` line are gauges. Histogram, summary and
//! untyped families are rejected, since records only carry counters and
//! gauges. Timestamps are accepted and dropped.
//!
//! HELP text is unescaped (`\\` and `\n`). Sample values are checked like
//! tab-separated values, and the format's own `+Inf`, `-Inf` and `Inf`
//! spellings are accepted on top.

use std::collections::HashMap;

use super::ParseError;
use crate::metric::{MetricRecord, MetricType, is_numeric_value, is_valid_metric_name};
use crate::util::{log_safe_line, trim_text};

/// One sample line broken into its parts.
struct Sample<'a> {
    name: &'a str,
    label: Option<&'a str>,
    value: &'a str,
}

fn exposition_error(reason: &'static str, line: &str) -> ParseError {
    ParseError::Exposition {
        reason,
        line: log_safe_line(line),
    }
}

/// Returns the byte length of a `{...}` label block at the start of `s`.
///
/// Braces inside quoted label values do not close the block.
fn label_block_len(s: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '}' if !in_quotes => return Some(idx + 1),
            _ => {}
        }
    }

    None
}

/// Undoes the escaping of a HELP docstring. Unknown escapes are kept as is.
fn unescape_help(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

fn is_sample_value(value: &str) -> bool {
    matches!(value, "+Inf" | "-Inf" | "Inf") || is_numeric_value(value)
}

fn parse_sample(line: &str) -> Result<Sample<'_>, ParseError> {
    let name_end = line
        .find(|c: char| c == '{' || c.is_whitespace())
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if name.is_empty() {
        return Err(exposition_error("missing metric name", line));
    }
    let mut rest = &line[name_end..];

    let label = if rest.starts_with('{') {
        let len = label_block_len(rest)
            .ok_or_else(|| exposition_error("unclosed label set", line))?;
        let block = &rest[..len];
        rest = &rest[len..];
        if block == "{}" { None } else { Some(block) }
    } else {
        None
    };

    let mut fields = rest.split_whitespace();
    let value = fields
        .next()
        .ok_or_else(|| exposition_error("missing value", line))?;
    if let Some(timestamp) = fields.next() {
        if timestamp.parse::<i64>().is_err() {
            return Err(exposition_error("invalid timestamp", line));
        }
    }
    if fields.next().is_some() {
        return Err(exposition_error("trailing fields", line));
    }

    Ok(Sample { name, label, value })
}

/// Parses exposition-format output into records.
///
/// `prefix` is prepended to every sample name before validation. The first
/// bad line fails the whole batch.
pub fn prom_to_metrics(prefix: &str, output: &str) -> Result<Vec<MetricRecord>, ParseError> {
    let mut helps: HashMap<&str, String> = HashMap::new();
    let mut types: HashMap<&str, MetricType> = HashMap::new();
    let mut metrics = Vec::new();

    for line in output.lines() {
        let line = trim_text(line);
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim_start();
            if let Some(rest) = comment.strip_prefix("HELP ") {
                let rest = rest.trim_start();
                let (name, text) = rest.split_once(' ').unwrap_or((rest, ""));
                helps.insert(name, unescape_help(text.trim_start()));
            } else if let Some(rest) = comment.strip_prefix("TYPE ") {
                let mut parts = rest.split_whitespace();
                let (Some(name), Some(type_name), None) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    return Err(exposition_error("malformed TYPE line", line));
                };
                let metric_type = match type_name {
                    "counter" => MetricType::Counter,
                    "gauge" => MetricType::Gauge,
                    _ => return Err(exposition_error("unsupported metric type", line)),
                };
                types.insert(name, metric_type);
            }
            continue;
        }

        let sample = parse_sample(line)?;

        let key = format!("{}{}", prefix, sample.name);
        if !is_valid_metric_name(&key) {
            return Err(ParseError::InvalidName(log_safe_line(&key)));
        }
        if !is_sample_value(sample.value) {
            return Err(ParseError::InvalidValue(log_safe_line(sample.value)));
        }

        metrics.push(MetricRecord {
            key,
            metric_type: types.get(sample.name).copied().unwrap_or(MetricType::Gauge),
            value: sample.value.to_string(),
            help: helps
                .get(sample.name)
                .cloned()
                .unwrap_or_else(|| sample.name.to_string()),
            label: sample.label.map(str::to_string),
        });
    }

    Ok(metrics)
}
