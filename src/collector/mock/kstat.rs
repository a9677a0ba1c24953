//! In-memory kstat reader for testing.

use async_trait::async_trait;

use crate::collector::kstat::{Kstat, KstatError, KstatReader, KstatSelector};

/// Kstat reader serving a fixed set of kstats.
///
/// `read` returns the stored kstats addressed by the selector, or the
/// configured failure for every read.
#[derive(Debug, Clone, Default)]
pub struct MockKstatReader {
    kstats: Vec<Kstat>,
    failure: Option<String>,
}

impl MockKstatReader {
    /// Creates a reader with no kstats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader whose every read fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            kstats: Vec::new(),
            failure: Some(message.into()),
        }
    }

    /// Adds a kstat.
    pub fn add_kstat(&mut self, kstat: Kstat) {
        self.kstats.push(kstat);
    }
}

#[async_trait]
impl KstatReader for MockKstatReader {
    async fn read(&self, selector: &KstatSelector) -> Result<Vec<Kstat>, KstatError> {
        if let Some(message) = &self.failure {
            return Err(KstatError::Read {
                selector: selector.to_string(),
                message: message.clone(),
            });
        }

        Ok(self
            .kstats
            .iter()
            .filter(|k| k.matches(selector))
            .cloned()
            .collect())
    }
}
