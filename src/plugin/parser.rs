//! Parser for plugin output.
//!
//! These are pure functions: no I/O, no state kept between calls. Parsing the
//! same output twice with the same prefix yields the same records.

use tracing::debug;

use super::ParseError;
use super::prom::prom_to_metrics;
use crate::metric::{MetricRecord, MetricType, is_numeric_value, is_valid_metric_name, split_label};
use crate::util::{log_safe_line, trim_text};

/// Wire format of one plugin's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `name\ttype\tvalue[\thelp]`, one metric per line.
    TabSeparated,
    /// Standard text exposition format.
    Exposition,
}

impl OutputFormat {
    /// Picks the format from a plugin path.
    ///
    /// `.prom` anywhere in the path selects [`OutputFormat::Exposition`], not
    /// only as a suffix (`metrics.prom.sh` is an exposition plugin).
    pub fn from_path(path: &str) -> Self {
        if path.contains(".prom") {
            OutputFormat::Exposition
        } else {
            OutputFormat::TabSeparated
        }
    }
}

/// Turns one trimmed, non-empty line of tab-separated output into a metric.
///
/// Format: `name \t type \t value [\t help]`. Help defaults to the original,
/// unprefixed name (label block included). `option` metrics never receive
/// the prefix.
pub fn line_to_metric(line: &str, prefix: &str) -> Result<MetricRecord, ParseError> {
    let chunks: Vec<&str> = line.split('\t').collect();
    if chunks.len() < 3 || chunks.len() > 4 {
        return Err(ParseError::UnparseableLine(log_safe_line(line)));
    }

    let raw_name = chunks[0];
    let type_name = chunks[1];
    let value = chunks[2];
    let help = chunks.get(3).copied().unwrap_or(raw_name);

    let (name, label) = split_label(raw_name);

    let metric_type = MetricType::from_name(type_name)
        .ok_or_else(|| ParseError::InvalidType(log_safe_line(line)))?;

    let key = if metric_type.is_prefixed() {
        format!("{}{}", prefix, name)
    } else {
        name.to_string()
    };

    if !is_valid_metric_name(&key) {
        return Err(ParseError::InvalidName(log_safe_line(&key)));
    }

    if !is_numeric_value(value) {
        return Err(ParseError::InvalidValue(log_safe_line(value)));
    }

    // Help text is opaque and never validated.
    Ok(MetricRecord {
        key,
        metric_type,
        value: value.to_string(),
        help: help.to_string(),
        label: label.map(str::to_string),
    })
}

/// Parses complete tab-separated output. Blank lines are skipped; the first
/// bad line aborts the whole batch and nothing parsed before it is returned.
fn parse_tab_separated(output: &str, prefix: &str) -> Result<Vec<MetricRecord>, ParseError> {
    output
        .split('\n')
        .map(trim_text)
        .filter(|line| !line.is_empty())
        .map(|line| line_to_metric(line, prefix))
        .collect()
}

/// Dispatches captured plugin output to the parser for its format.
#[derive(Debug, Default, Clone, Copy)]
pub struct PluginOutputParser;

impl PluginOutputParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses the complete output of one plugin invocation.
    ///
    /// Returns every record, or the first error with no records at all.
    pub fn parse(
        &self,
        format: OutputFormat,
        prefix: &str,
        output: &str,
    ) -> Result<Vec<MetricRecord>, ParseError> {
        let metrics = match format {
            OutputFormat::TabSeparated => parse_tab_separated(output, prefix)?,
            OutputFormat::Exposition => prom_to_metrics(prefix, output)?,
        };
        debug!(?format, count = metrics.len(), "parsed plugin output");
        Ok(metrics)
    }

    /// Like [`parse`](Self::parse), resolving the format from the plugin path.
    pub fn parse_path(
        &self,
        path: &str,
        prefix: &str,
        output: &str,
    ) -> Result<Vec<MetricRecord>, ParseError> {
        self.parse(OutputFormat::from_path(path), prefix, output)
    }
}
