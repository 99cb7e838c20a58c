//! HTTP source
//!
//! Requests pages from a REST endpoint using offset and limit query
//! parameters. Common patterns:
//! - `GET /items?offset=40&limit=20` returning `[...]`
//! - `GET /items?skip=40&take=20` returning `{"data": [...]}`

use super::PageSource;
use crate::config::HttpSourceConfig;
use crate::error::{Error, Result};
use crate::result::{try_fetch, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Page source backed by an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
    config: HttpSourceConfig,
}

impl HttpSource {
    /// Create a source for `base_url`
    pub fn new(base_url: &str, config: HttpSourceConfig) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("pagewise/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// URL requested for a page
    pub fn page_url(&self, offset: u64, limit: usize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.config.offset_param, &offset.to_string())
            .append_pair(&self.config.limit_param, &limit.to_string());
        url
    }

    async fn request(&self, offset: u64, limit: usize) -> Result<Vec<Value>> {
        let url = self.page_url(offset, limit);
        debug!(%url, "Fetching page");

        let mut request = self.client.get(url);
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body: Value = response.json().await?;
        extract_records(&body, self.config.records_field.as_deref())
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, offset: u64, limit: usize) -> FetchResult<Vec<Value>> {
        try_fetch(async {
            let result = self.request(offset, limit).await;
            if let Err(e) = &result {
                if e.is_fetch_error() {
                    warn!(offset, limit, error = %e, "Page request failed");
                }
            }
            result.map_err(anyhow::Error::from)
        })
        .await
    }
}

/// Pull the record array out of a response body
pub(crate) fn extract_records(body: &Value, field: Option<&str>) -> Result<Vec<Value>> {
    let target = match field {
        Some(name) => body
            .get(name)
            .ok_or_else(|| Error::decode(format!("missing field '{name}'")))?,
        None => body,
    };

    target
        .as_array()
        .cloned()
        .ok_or_else(|| Error::decode("expected a JSON array of records"))
}
