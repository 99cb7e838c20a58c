//! Feed state holder

use crate::config::FeedConfig;
use crate::error::Result;
use crate::pagination::{DefaultPaginator, LoadOutcome, PaginationState, Paginator};
use crate::result::FetchResult;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Paginated list with observable state
///
/// The paginator's callbacks write into a shared [`PaginationState`];
/// observers get every update through [`subscribe`](Self::subscribe).
///
/// Loads take turns through `loads`. A refresh cancels the current
/// `generation` so a stale page never lands in the cleared list.
pub struct Feed<K, I> {
    paginator: DefaultPaginator<K, I>,
    state: Arc<watch::Sender<PaginationState<I>>>,
    loads: AsyncMutex<()>,
    generation: Mutex<CancellationToken>,
}

impl<K, I> Feed<K, I>
where
    K: Clone + Send + Sync + 'static,
    I: Send + Sync + 'static,
{
    /// Create a feed over `fetch`, advancing keys with `next_key`
    pub fn new<F, Fut, N>(initial_key: K, fetch: F, next_key: N, config: FeedConfig) -> Result<Self>
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FetchResult<Vec<I>>> + Send + 'static,
        N: Fn(&K, &[I]) -> K + Send + Sync + 'static,
    {
        let (sender, _) = watch::channel(PaginationState::new());
        let state = Arc::new(sender);
        let end_condition = config.end_condition();

        let loading_state = state.clone();
        let error_state = state.clone();
        let page_state = state.clone();

        let paginator = DefaultPaginator::builder(initial_key)
            .config(&config.paginator)
            .on_fetch_page(fetch)
            .compute_next_key_from(next_key)
            .on_loading_state_changed(move |loading| {
                loading_state.send_modify(|state| state.set_loading(loading));
            })
            .on_error(move |message| {
                error_state.send_modify(|state| state.set_error(message));
            })
            .on_page_loaded(move |items: Vec<I>, _key: K| {
                let end_reached = end_condition.is_end(items.len());
                if end_reached {
                    debug!("End of data reached");
                }
                page_state.send_modify(|state| state.append_page(items, end_reached));
            })
            .build()?;

        Ok(Self {
            paginator,
            state,
            loads: AsyncMutex::new(()),
            generation: Mutex::new(CancellationToken::new()),
        })
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<PaginationState<I>> {
        self.state.subscribe()
    }

    /// Run `f` against the current state without cloning it
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&PaginationState<I>) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Load the next page unless the end was already reached
    pub async fn load_more(&self) -> LoadOutcome {
        self.load(None).await
    }

    /// Like [`load_more`](Self::load_more), abandoning the fetch on cancellation
    pub async fn load_more_with_cancel(&self, token: &CancellationToken) -> LoadOutcome {
        self.load(Some(token)).await
    }

    /// Start over from the initial key with a cleared list
    ///
    /// A load still in flight is cancelled and awaited first, so its page
    /// is discarded and the restart fetches from the initial key.
    pub async fn refresh(&self) -> LoadOutcome {
        let stale = std::mem::replace(&mut *self.generation(), CancellationToken::new());
        stale.cancel();

        let _turn = self.loads.lock().await;
        self.paginator.reset();
        self.state.send_modify(PaginationState::clear);
        debug!("Feed refreshed");

        let current = self.generation().clone();
        self.paginator.load_next_items_with_cancel(&current).await
    }

    /// Record whether the list is currently filtered
    pub fn set_filter_applied(&self, applied: bool) {
        self.state
            .send_modify(|state| state.is_filter_applied = applied);
    }

    /// Key the next load will use
    pub fn current_key(&self) -> K {
        self.paginator.current_key()
    }

    async fn load(&self, cancel: Option<&CancellationToken>) -> LoadOutcome {
        if self.end_reached() {
            debug!("Feed already complete, not loading");
            return LoadOutcome::Skipped;
        }
        let Ok(_turn) = self.loads.try_lock() else {
            debug!("Feed load already in flight, skipping");
            return LoadOutcome::Skipped;
        };

        let current = self.generation().child_token();
        let Some(external) = cancel else {
            return self.paginator.load_next_items_with_cancel(&current).await;
        };

        // Relay the caller's token into this load's token; the relay never
        // finishes on its own, so the load always reports its outcome.
        let relay = async {
            external.cancelled().await;
            current.cancel();
            futures::future::pending::<()>().await;
        };
        tokio::select! {
            biased;
            outcome = self.paginator.load_next_items_with_cancel(&current) => outcome,
            () = relay => LoadOutcome::Cancelled,
        }
    }

    fn end_reached(&self) -> bool {
        self.state.borrow().end_reached
    }

    fn generation(&self) -> MutexGuard<'_, CancellationToken> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, I> Feed<K, I>
where
    K: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    /// Clone the current state
    pub fn snapshot(&self) -> PaginationState<I> {
        self.state.borrow().clone()
    }
}
