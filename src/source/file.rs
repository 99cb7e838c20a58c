//! JSON file source

use super::PageSource;
use crate::error::{Error, Result};
use crate::result::FetchResult;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Records read once from a JSON array and served in slices
#[derive(Debug, Clone, Default)]
pub struct JsonFileSource {
    records: Vec<Value>,
}

impl JsonFileSource {
    /// Load records from a file holding a JSON array
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let body: Value = serde_json::from_str(&contents)?;
        match body {
            Value::Array(records) => {
                debug!(path = %path.display(), count = records.len(), "Loaded records");
                Ok(Self { records })
            }
            _ => Err(Error::decode(format!(
                "expected a JSON array in {}",
                path.display()
            ))),
        }
    }

    /// Serve the given records
    pub fn from_records(records: Vec<Value>) -> Self {
        Self { records }
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PageSource for JsonFileSource {
    async fn fetch(&self, offset: u64, limit: usize) -> FetchResult<Vec<Value>> {
        let start = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        let end = start.saturating_add(limit).min(self.records.len());
        FetchResult::Success(self.records[start..end].to_vec())
    }
}
