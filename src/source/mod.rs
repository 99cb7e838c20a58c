//! Data sources
//!
//! Ready-made page fetchers that map their own failures (missing files,
//! HTTP status codes, transport and decode errors) into
//! [`FetchResult::Failure`](crate::result::FetchResult::Failure).

mod file;
mod http;

pub use file::JsonFileSource;
pub use http::HttpSource;

use crate::result::FetchResult;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;

/// A source of JSON records addressed by offset
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch up to `limit` records starting at `offset`
    async fn fetch(&self, offset: u64, limit: usize) -> FetchResult<Vec<Value>>;
}

/// Adapt a source into an `on_fetch_page` function using offset keys
pub fn offset_fetcher(
    source: Arc<dyn PageSource>,
    limit: usize,
) -> impl Fn(u64) -> BoxFuture<'static, FetchResult<Vec<Value>>> + Send + Sync + 'static {
    move |offset: u64| {
        let source = source.clone();
        async move { source.fetch(offset, limit).await }.boxed()
    }
}
