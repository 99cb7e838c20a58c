//! Pagination types and traits
//!
//! Defines the core pagination abstractions shared by the controller and
//! the state holders built on top of it.

use crate::result::FetchResult;
use crate::text::UiText;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;

/// Fetches one page for a key
pub type FetchPageFn<K, I> = Box<dyn Fn(K) -> BoxFuture<'static, FetchResult<Vec<I>>> + Send + Sync>;

/// Derives the next key from the key just fetched and the page it returned
pub type NextKeyFn<K, I> = Box<dyn Fn(&K, &[I]) -> K + Send + Sync>;

/// Receives loading transitions
pub type LoadingFn = Box<dyn Fn(bool) + Send + Sync>;

/// Receives fetch failures
pub type ErrorFn = Box<dyn Fn(Option<UiText>) + Send + Sync>;

/// Receives a fetched page together with the advanced key
pub type PageLoadedFn<K, I> = Box<dyn Fn(Vec<I>, K) + Send + Sync>;

/// What a call to `load_next_items` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and the key advanced
    Loaded {
        /// Number of items in the page
        count: usize,
    },
    /// The fetch failed; the key was not advanced
    Failed,
    /// The fetch did not settle in time; the key was not advanced
    TimedOut,
    /// The fetch was abandoned through its cancellation token
    Cancelled,
    /// Another request was already in flight, nothing happened
    Skipped,
}

impl LoadOutcome {
    /// Check if a page was loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    /// Check if the call was rejected by the in-flight guard
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Check if the fetch ended with an error reported through `on_error`
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut)
    }
}

/// When a page is considered the last one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndCondition {
    /// Stop when a page comes back empty
    #[default]
    EmptyPage,
    /// Stop when a page has fewer items than requested
    ShortPage {
        /// Number of items requested per page
        page_size: usize,
    },
}

impl EndCondition {
    /// Check whether a page of `count` items ends the data
    pub fn is_end(&self, count: usize) -> bool {
        match self {
            Self::EmptyPage => count == 0,
            Self::ShortPage { page_size } => count == 0 || count < *page_size,
        }
    }
}

/// Snapshot of a paginated list for a view layer
///
/// The controller never touches this struct; its owner updates it from
/// the controller's callbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationState<T> {
    pub is_loading: bool,
    pub items: Vec<T>,
    pub error: Option<UiText>,
    pub end_reached: bool,
    pub page: u32,
    pub is_initial_load: bool,
    pub is_empty: bool,
    pub is_filter_applied: bool,
}

impl<T> Default for PaginationState<T> {
    fn default() -> Self {
        Self {
            is_loading: false,
            items: Vec::new(),
            error: None,
            end_reached: false,
            page: 0,
            is_initial_load: true,
            is_empty: false,
            is_filter_applied: false,
        }
    }
}

impl<T> PaginationState<T> {
    /// Create an empty state awaiting its first load
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a loading transition
    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Append a freshly loaded page
    pub fn append_page(&mut self, items: Vec<T>, end_reached: bool) {
        self.items.extend(items);
        self.page += 1;
        self.end_reached = end_reached;
        self.error = None;
        self.is_initial_load = false;
        self.is_empty = self.items.is_empty();
    }

    /// Record a failed load
    pub fn set_error(&mut self, error: Option<UiText>) {
        self.error = error;
    }

    /// Return to the initial state, keeping the filter flag
    pub fn clear(&mut self) {
        let is_filter_applied = self.is_filter_applied;
        *self = Self {
            is_filter_applied,
            ..Self::default()
        };
    }
}

/// Core trait for paginated loading
#[async_trait]
pub trait Paginator: Send + Sync {
    /// Fetch the page at the current key, unless a fetch is already running
    async fn load_next_items(&self) -> LoadOutcome;

    /// Move the key back to its initial value
    fn reset(&self);
}
