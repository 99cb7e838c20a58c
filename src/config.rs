//! Configuration types
//!
//! Settings for paginators, feeds and HTTP sources, loadable from YAML or
//! JSON.
//!
//! ```yaml
//! feed:
//!   page_size: 20
//!   paginator:
//!     fetch_timeout_ms: 5000
//! source:
//!   offset_param: offset
//!   limit_param: limit
//!   records_field: data
//! ```

use crate::error::{Error, Result};
use crate::pagination::EndCondition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration for the `pagewise` binary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// HTTP source settings
    #[serde(default)]
    pub source: HttpSourceConfig,
}

impl AppConfig {
    /// Parse from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file, choosing the format by extension (`.json` or YAML)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }
}

// ============================================================================
// Paginator Config
// ============================================================================

/// Paginator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// Give up on a fetch after this many milliseconds
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,
}

impl PaginatorConfig {
    /// Fetch timeout as a duration
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

// ============================================================================
// Feed Config
// ============================================================================

/// Feed settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Items requested per page; a shorter page ends the feed
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Settings for the feed's paginator
    #[serde(default)]
    pub paginator: PaginatorConfig,
}

impl FeedConfig {
    /// How the feed detects its last page
    pub fn end_condition(&self) -> EndCondition {
        match self.page_size {
            Some(page_size) if page_size > 0 => EndCondition::ShortPage { page_size },
            _ => EndCondition::EmptyPage,
        }
    }
}

// ============================================================================
// HTTP Source Config
// ============================================================================

/// HTTP source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Query parameter carrying the offset
    #[serde(default = "default_offset_param")]
    pub offset_param: String,

    /// Query parameter carrying the page size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Top-level field holding the records (the body itself when absent)
    #[serde(default)]
    pub records_field: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra headers for every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            offset_param: default_offset_param(),
            limit_param: default_limit_param(),
            records_field: None,
            timeout_ms: default_timeout_ms(),
            headers: HashMap::new(),
        }
    }
}
