//! Default paginator implementation
//!
//! Drives successive page loads through caller-supplied strategy functions,
//! keeping at most one fetch in flight per instance.

use super::types::{
    ErrorFn, FetchPageFn, LoadOutcome, LoadingFn, NextKeyFn, PageLoadedFn, Paginator,
};
use crate::config::PaginatorConfig;
use crate::error::{Error, Result};
use crate::result::FetchResult;
use crate::text::UiText;
use async_trait::async_trait;
use futures::FutureExt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Paginator driven by injected strategy functions
///
/// Loading sequence for a fresh call:
///
/// 1. mark the request in flight and call `on_loading_state_changed(true)`
/// 2. await `on_fetch_page(current_key)`
/// 3. clear the in-flight mark
/// 4. on success, advance the key, then call `on_page_loaded(items, key)`;
///    on failure, call `on_error(message)` and keep the key
/// 5. call `on_loading_state_changed(false)`
///
/// Because the mark is cleared before step 4, callbacks may start the next
/// load right away.
pub struct DefaultPaginator<K, I> {
    initial_key: K,
    current_key: Mutex<K>,
    is_making_request: AtomicBool,
    fetch_timeout: Option<Duration>,
    on_loading_state_changed: LoadingFn,
    on_fetch_page: FetchPageFn<K, I>,
    compute_next_key: NextKeyFn<K, I>,
    on_error: ErrorFn,
    on_page_loaded: PageLoadedFn<K, I>,
}

/// How a fetch ended before its result is interpreted
enum Settled<I> {
    Done(FetchResult<Vec<I>>),
    TimedOut { timeout_ms: u64 },
    Cancelled,
}

/// Clears the in-flight mark when dropped, so an abandoned or panicking
/// fetch cannot wedge the paginator
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<K, I> DefaultPaginator<K, I>
where
    K: Clone + Send + Sync + 'static,
    I: Send + 'static,
{
    /// Create a paginator from the full strategy set
    pub fn new<L, F, Fut, N, E, P>(
        initial_key: K,
        on_loading_state_changed: L,
        on_fetch_page: F,
        compute_next_key: N,
        on_error: E,
        on_page_loaded: P,
    ) -> Self
    where
        L: Fn(bool) + Send + Sync + 'static,
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FetchResult<Vec<I>>> + Send + 'static,
        N: Fn(&[I]) -> K + Send + Sync + 'static,
        E: Fn(Option<UiText>) + Send + Sync + 'static,
        P: Fn(Vec<I>, K) + Send + Sync + 'static,
    {
        Self {
            current_key: Mutex::new(initial_key.clone()),
            initial_key,
            is_making_request: AtomicBool::new(false),
            fetch_timeout: None,
            on_loading_state_changed: Box::new(on_loading_state_changed),
            on_fetch_page: box_fetch(on_fetch_page),
            compute_next_key: Box::new(move |_key: &K, items: &[I]| compute_next_key(items)),
            on_error: Box::new(on_error),
            on_page_loaded: Box::new(on_page_loaded),
        }
    }

    /// Start building a paginator
    pub fn builder(initial_key: K) -> PaginatorBuilder<K, I> {
        PaginatorBuilder::new(initial_key)
    }

    /// Key the next fetch will use
    pub fn current_key(&self) -> K {
        self.key().clone()
    }

    /// Key restored by [`reset`](Paginator::reset)
    pub fn initial_key(&self) -> &K {
        &self.initial_key
    }

    /// Check whether a fetch is in flight
    pub fn is_making_request(&self) -> bool {
        self.is_making_request.load(Ordering::Acquire)
    }

    /// Like `load_next_items`, but gives up when `token` is cancelled
    ///
    /// A cancelled fetch reports only `on_loading_state_changed(false)` and
    /// leaves the key where it was.
    pub async fn load_next_items_with_cancel(&self, token: &CancellationToken) -> LoadOutcome {
        self.load(Some(token)).await
    }

    async fn load(&self, cancel: Option<&CancellationToken>) -> LoadOutcome {
        if self
            .is_making_request
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Request already in flight, skipping load");
            return LoadOutcome::Skipped;
        }
        let guard = InFlight(&self.is_making_request);

        (self.on_loading_state_changed)(true);
        let key = self.current_key();
        debug!("Loading next page");

        let settled = self.fetch(key.clone(), cancel).await;
        drop(guard);

        let outcome = match settled {
            Settled::Done(FetchResult::Success(items)) => {
                let next_key = (self.compute_next_key)(&key, &items);
                *self.key() = next_key.clone();
                let count = items.len();
                debug!(count, "Page loaded");
                (self.on_page_loaded)(items, next_key);
                LoadOutcome::Loaded { count }
            }
            Settled::Done(FetchResult::Failure(message)) => {
                let described = message
                    .as_ref()
                    .map_or_else(|| "no description".to_string(), ToString::to_string);
                warn!(error = %described, "Page fetch failed");
                (self.on_error)(message);
                LoadOutcome::Failed
            }
            Settled::TimedOut { timeout_ms } => {
                warn!(timeout_ms, "Page fetch timed out");
                (self.on_error)(Some(UiText::from(&Error::Timeout { timeout_ms })));
                LoadOutcome::TimedOut
            }
            Settled::Cancelled => {
                debug!("Page fetch cancelled");
                LoadOutcome::Cancelled
            }
        };

        (self.on_loading_state_changed)(false);
        outcome
    }

    async fn fetch(&self, key: K, cancel: Option<&CancellationToken>) -> Settled<I> {
        let request = (self.on_fetch_page)(key);
        let bounded = async {
            match self.fetch_timeout {
                Some(limit) => match tokio::time::timeout(limit, request).await {
                    Ok(result) => Settled::Done(result),
                    Err(_) => Settled::TimedOut {
                        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    },
                },
                None => Settled::Done(request.await),
            }
        };

        match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Settled::Cancelled,
                settled = bounded => settled,
            },
            None => bounded.await,
        }
    }

    fn key(&self) -> MutexGuard<'_, K> {
        self.current_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<K, I> Paginator for DefaultPaginator<K, I>
where
    K: Clone + Send + Sync + 'static,
    I: Send + 'static,
{
    async fn load_next_items(&self) -> LoadOutcome {
        self.load(None).await
    }

    fn reset(&self) {
        *self.key() = self.initial_key.clone();
        debug!("Paginator reset to initial key");
    }
}

impl<K, I> std::fmt::Debug for DefaultPaginator<K, I>
where
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultPaginator")
            .field("initial_key", &self.initial_key)
            .field("current_key", &self.current_key)
            .field("is_making_request", &self.is_making_request)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

fn box_fetch<K, I, F, Fut>(on_fetch_page: F) -> FetchPageFn<K, I>
where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchResult<Vec<I>>> + Send + 'static,
{
    Box::new(move |key: K| on_fetch_page(key).boxed())
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`DefaultPaginator`]
///
/// `on_fetch_page` and one of `compute_next_key` / `compute_next_key_from`
/// are required. The callbacks default to doing nothing.
pub struct PaginatorBuilder<K, I> {
    initial_key: K,
    fetch_timeout: Option<Duration>,
    on_loading_state_changed: Option<LoadingFn>,
    on_fetch_page: Option<FetchPageFn<K, I>>,
    compute_next_key: Option<NextKeyFn<K, I>>,
    on_error: Option<ErrorFn>,
    on_page_loaded: Option<PageLoadedFn<K, I>>,
}

impl<K, I> PaginatorBuilder<K, I>
where
    K: Clone + Send + Sync + 'static,
    I: Send + 'static,
{
    /// Create a builder starting at `initial_key`
    pub fn new(initial_key: K) -> Self {
        Self {
            initial_key,
            fetch_timeout: None,
            on_loading_state_changed: None,
            on_fetch_page: None,
            compute_next_key: None,
            on_error: None,
            on_page_loaded: None,
        }
    }

    /// Apply settings from a config
    #[must_use]
    pub fn config(mut self, config: &PaginatorConfig) -> Self {
        self.fetch_timeout = config.fetch_timeout();
        self
    }

    /// Give up on fetches that take longer than `timeout`
    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Set the loading transition callback
    #[must_use]
    pub fn on_loading_state_changed<L>(mut self, callback: L) -> Self
    where
        L: Fn(bool) + Send + Sync + 'static,
    {
        self.on_loading_state_changed = Some(Box::new(callback));
        self
    }

    /// Set the data source
    #[must_use]
    pub fn on_fetch_page<F, Fut>(mut self, fetch: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FetchResult<Vec<I>>> + Send + 'static,
    {
        self.on_fetch_page = Some(box_fetch(fetch));
        self
    }

    /// Derive the next key from the items of the page just received
    #[must_use]
    pub fn compute_next_key<N>(mut self, next_key: N) -> Self
    where
        N: Fn(&[I]) -> K + Send + Sync + 'static,
    {
        self.compute_next_key = Some(Box::new(move |_key: &K, items: &[I]| next_key(items)));
        self
    }

    /// Derive the next key from the key just fetched and its items
    #[must_use]
    pub fn compute_next_key_from<N>(mut self, next_key: N) -> Self
    where
        N: Fn(&K, &[I]) -> K + Send + Sync + 'static,
    {
        self.compute_next_key = Some(Box::new(next_key));
        self
    }

    /// Set the failure callback
    #[must_use]
    pub fn on_error<E>(mut self, callback: E) -> Self
    where
        E: Fn(Option<UiText>) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Set the success callback
    #[must_use]
    pub fn on_page_loaded<P>(mut self, callback: P) -> Self
    where
        P: Fn(Vec<I>, K) + Send + Sync + 'static,
    {
        self.on_page_loaded = Some(Box::new(callback));
        self
    }

    /// Build the paginator
    pub fn build(self) -> Result<DefaultPaginator<K, I>> {
        let on_fetch_page = self
            .on_fetch_page
            .ok_or_else(|| Error::missing_strategy("on_fetch_page"))?;
        let compute_next_key = self
            .compute_next_key
            .ok_or_else(|| Error::missing_strategy("compute_next_key"))?;

        Ok(DefaultPaginator {
            current_key: Mutex::new(self.initial_key.clone()),
            initial_key: self.initial_key,
            is_making_request: AtomicBool::new(false),
            fetch_timeout: self.fetch_timeout,
            on_loading_state_changed: self
                .on_loading_state_changed
                .unwrap_or_else(|| Box::new(|_: bool| {})),
            on_fetch_page,
            compute_next_key,
            on_error: self
                .on_error
                .unwrap_or_else(|| Box::new(|_: Option<UiText>| {})),
            on_page_loaded: self
                .on_page_loaded
                .unwrap_or_else(|| Box::new(|_: Vec<I>, _: K| {})),
        })
    }
}
