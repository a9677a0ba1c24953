//! Collector backed by an external plugin program.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::parser::{OutputFormat, PluginOutputParser};
use crate::collector::{CollectContext, CollectError, Collector};
use crate::metric::MetricRecord;

/// Configuration of one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Path of the plugin executable. Also selects the output format.
    pub path: String,
    /// Prepended to every counter and gauge name the plugin reports.
    pub prefix: String,
    /// How long the plugin's metrics stay valid.
    pub ttl: Duration,
}

impl PluginConfig {
    pub fn new(path: impl Into<String>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
            ttl,
        }
    }

    /// Output format implied by the plugin path.
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_path(&self.path)
    }
}

/// Runs a plugin and captures its standard output.
///
/// Spawning, timeouts and cancellation are the executor's business; a
/// timed-out run is reported as an error of kind `TimedOut`.
#[async_trait]
pub trait PluginExecutor: Send + Sync {
    async fn execute(&self, path: &str, ctx: &CollectContext) -> io::Result<String>;
}

#[async_trait]
impl<E: PluginExecutor + ?Sized> PluginExecutor for Arc<E> {
    async fn execute(&self, path: &str, ctx: &CollectContext) -> io::Result<String> {
        (**self).execute(path, ctx).await
    }
}

/// Exposes one plugin as a [`Collector`].
pub struct PluginCollector<E: PluginExecutor> {
    config: PluginConfig,
    format: OutputFormat,
    parser: PluginOutputParser,
    executor: E,
}

impl<E: PluginExecutor> PluginCollector<E> {
    pub fn new(config: PluginConfig, executor: E) -> Self {
        Self {
            format: config.format(),
            config,
            parser: PluginOutputParser::new(),
            executor,
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }
}

#[async_trait]
impl<E: PluginExecutor> Collector for PluginCollector<E> {
    async fn get_metrics(&self, ctx: &CollectContext) -> Result<Vec<MetricRecord>, CollectError> {
        let output = self
            .executor
            .execute(&self.config.path, ctx)
            .await
            .map_err(|source| CollectError::Plugin {
                path: self.config.path.clone(),
                source,
            })?;

        Ok(self.parser.parse(self.format, &self.config.prefix, &output)?)
    }

    fn cache_ttl(&self) -> Duration {
        self.config.ttl
    }
}
