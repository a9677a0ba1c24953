//! In-memory plugin executor for testing.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::collector::CollectContext;
use crate::plugin::PluginExecutor;

/// Plugin executor returning canned output per plugin path.
///
/// Paths without canned output fail with `NotFound`, like a missing
/// executable would.
#[derive(Debug, Default)]
pub struct MockExecutor {
    outputs: HashMap<String, Result<String, io::ErrorKind>>,
    calls: AtomicUsize,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the captured stdout returned for `path`.
    pub fn add_output(&mut self, path: impl Into<String>, output: impl Into<String>) {
        self.outputs.insert(path.into(), Ok(output.into()));
    }

    /// Makes every run of `path` fail with `kind`.
    pub fn add_failure(&mut self, path: impl Into<String>, kind: io::ErrorKind) {
        self.outputs.insert(path.into(), Err(kind));
    }

    /// Number of `execute` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginExecutor for MockExecutor {
    async fn execute(&self, path: &str, _ctx: &CollectContext) -> io::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outputs.get(path) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(kind)) => Err(io::Error::new(*kind, format!("{} failed", path))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ZoneInfo;

    #[tokio::test]
    async fn test_mock_executor_counts_calls() {
        let mut executor = MockExecutor::new();
        executor.add_output("/a", "x\tgauge\t1\n");
        let ctx = CollectContext::new(ZoneInfo::global());

        assert_eq!(executor.execute("/a", &ctx).await.unwrap(), "x\tgauge\t1\n");
        let err = executor.execute("/missing", &ctx).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(executor.call_count(), 2);
    }
}
