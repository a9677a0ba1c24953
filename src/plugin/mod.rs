//! Plugin output handling.
//!
//! Plugins are external programs whose captured stdout is turned into
//! [`MetricRecord`](crate::metric::MetricRecord)s. Two wire formats exist:
//!
//! - tab-separated lines, `name\ttype\tvalue[\thelp]` ([`parser`])
//! - the standard text exposition format ([`prom`]), selected when the
//!   plugin path contains `.prom`
//!
//! Output is trusted as a whole or not at all: the first bad line fails the
//! entire invocation.

pub mod collector;
pub mod parser;
pub mod prom;

pub use collector::{PluginCollector, PluginConfig, PluginExecutor};
pub use parser::{OutputFormat, PluginOutputParser, line_to_metric};
pub use prom::prom_to_metrics;

use thiserror::Error;

/// Error produced while parsing plugin output.
///
/// Every payload is already passed through
/// [`log_safe_line`](crate::util::log_safe_line).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line did not split into 3 or 4 tab-separated fields.
    #[error("unable to parse line: [{0}]")]
    UnparseableLine(String),
    /// Type field outside `counter`, `gauge`, `option`.
    #[error("invalid type on line: [{0}]")]
    InvalidType(String),
    /// Name (after prefixing) does not match `^[a-zA-Z_:][a-zA-Z0-9_:]*$`.
    #[error("invalid name: [{0}]")]
    InvalidName(String),
    /// Value is not a number.
    #[error("invalid value: [{0}]")]
    InvalidValue(String),
    /// Malformed exposition-format input.
    #[error("invalid exposition line ({reason}): [{line}]")]
    Exposition { reason: &'static str, line: String },
}
