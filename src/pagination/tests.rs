//! Tests for pagination module

use super::*;
use crate::config::PaginatorConfig;
use crate::error::Error;
use crate::result::FetchResult;
use crate::text::UiText;
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_test::{assert_pending, assert_ready};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Harness
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Loading(bool),
    Fetch(u32),
    Loaded(Vec<char>, u32),
    Error(Option<String>),
}

type Log = Arc<Mutex<Vec<Event>>>;

fn take(log: &Log) -> Vec<Event> {
    std::mem::take(&mut *log.lock().unwrap())
}

/// Paginator that answers fetches from a script and records every callback
fn scripted<N>(
    log: &Log,
    responses: Vec<FetchResult<Vec<char>>>,
    next_key: N,
) -> PaginatorBuilder<u32, char>
where
    N: Fn(&u32, &[char]) -> u32 + Send + Sync + 'static,
{
    let script = Arc::new(Mutex::new(VecDeque::from(responses)));
    let fetch_log = log.clone();
    let loading_log = log.clone();
    let error_log = log.clone();
    let loaded_log = log.clone();

    DefaultPaginator::builder(0)
        .on_fetch_page(move |key| {
            fetch_log.lock().unwrap().push(Event::Fetch(key));
            let next = script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| FetchResult::failure_text("script exhausted"));
            async move { next }
        })
        .compute_next_key_from(next_key)
        .on_loading_state_changed(move |loading| {
            loading_log.lock().unwrap().push(Event::Loading(loading));
        })
        .on_error(move |message| {
            error_log
                .lock()
                .unwrap()
                .push(Event::Error(message.map(|m| m.to_string())));
        })
        .on_page_loaded(move |items, key| {
            loaded_log.lock().unwrap().push(Event::Loaded(items, key));
        })
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[tokio::test]
async fn test_success_advances_key() {
    let log = Log::default();
    let paginator = scripted(
        &log,
        vec![FetchResult::success(vec!['a', 'b', 'c']), FetchResult::success(vec!['d'])],
        |_, _| 1,
    )
    .build()
    .unwrap();

    let outcome = paginator.load_next_items().await;

    assert_eq!(outcome, LoadOutcome::Loaded { count: 3 });
    assert_eq!(paginator.current_key(), 1);
    assert_eq!(
        take(&log),
        vec![
            Event::Loading(true),
            Event::Fetch(0),
            Event::Loaded(vec!['a', 'b', 'c'], 1),
            Event::Loading(false),
        ]
    );

    paginator.load_next_items().await;
    assert_eq!(take(&log)[1], Event::Fetch(1));
}

#[tokio::test]
async fn test_failure_keeps_key() {
    let log = Log::default();
    let paginator = scripted(
        &log,
        vec![FetchResult::failure_text("network down")],
        |key, _| key + 1,
    )
    .build()
    .unwrap();

    let outcome = paginator.load_next_items().await;

    assert_eq!(outcome, LoadOutcome::Failed);
    assert_eq!(paginator.current_key(), 0);
    assert_eq!(
        take(&log),
        vec![
            Event::Loading(true),
            Event::Fetch(0),
            Event::Error(Some("network down".to_string())),
            Event::Loading(false),
        ]
    );
}

#[tokio::test]
async fn test_failure_without_description() {
    let log = Log::default();
    let paginator = scripted(&log, vec![FetchResult::failure(None)], |key, _| key + 1)
        .build()
        .unwrap();

    paginator.load_next_items().await;
    assert!(take(&log).contains(&Event::Error(None)));
}

#[tokio::test]
async fn test_overlapping_call_is_skipped() {
    let gate = Arc::new(Notify::new());
    let fetches = Arc::new(AtomicUsize::new(0));
    let loading_events = Arc::new(AtomicUsize::new(0));

    let paginator = DefaultPaginator::builder(0u32)
        .on_fetch_page({
            let gate = gate.clone();
            let fetches = fetches.clone();
            move |_key| {
                fetches.fetch_add(1, Ordering::SeqCst);
                let gate = gate.clone();
                async move {
                    gate.notified().await;
                    FetchResult::success(vec!['x'])
                }
            }
        })
        .compute_next_key(|items: &[char]| items.len() as u32)
        .on_loading_state_changed({
            let loading_events = loading_events.clone();
            move |_| {
                loading_events.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build()
        .unwrap();

    let mut first = tokio_test::task::spawn(paginator.load_next_items());
    assert_pending!(first.poll());
    assert!(paginator.is_making_request());

    let second = paginator.load_next_items().await;
    assert_eq!(second, LoadOutcome::Skipped);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(loading_events.load(Ordering::SeqCst), 1);

    gate.notify_one();
    let outcome = assert_ready!(first.poll());
    assert_eq!(outcome, LoadOutcome::Loaded { count: 1 });
    assert!(!paginator.is_making_request());
    assert_eq!(loading_events.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_reset_after_failure_restarts_from_initial_key() {
    let log = Log::default();
    let paginator = scripted(
        &log,
        vec![
            FetchResult::success(vec!['a']),
            FetchResult::failure_text("network down"),
            FetchResult::success(vec!['a']),
        ],
        |key, items| key + items.len() as u32,
    )
    .build()
    .unwrap();

    paginator.load_next_items().await;
    paginator.load_next_items().await;
    assert_eq!(paginator.current_key(), 1);
    take(&log);

    paginator.reset();
    assert!(take(&log).is_empty(), "reset must not emit callbacks");
    assert_eq!(paginator.current_key(), 0);

    paginator.load_next_items().await;
    assert_eq!(take(&log)[1], Event::Fetch(0));
}

#[tokio::test]
async fn test_reset_after_many_pages() {
    let log = Log::default();
    let pages = (0..5).map(|_| FetchResult::success(vec!['p'])).collect();
    let paginator = scripted(&log, pages, page_number_key()).build().unwrap();

    for _ in 0..5 {
        paginator.load_next_items().await;
    }
    assert_eq!(paginator.current_key(), 5);

    paginator.reset();
    assert_eq!(paginator.current_key(), *paginator.initial_key());
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_at_most_one_fetch_in_flight_across_tasks() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let paginator = Arc::new(
        DefaultPaginator::builder(0u64)
            .on_fetch_page({
                let active = active.clone();
                let peak = peak.clone();
                move |_key| {
                    let active = active.clone();
                    let peak = peak.clone();
                    async move {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        FetchResult::success(vec![1u8, 2])
                    }
                }
            })
            .compute_next_key_from(offset_key())
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let paginator = paginator.clone();
            tokio::spawn(async move { paginator.load_next_items().await })
        })
        .collect();

    let mut loaded = 0u64;
    for handle in handles {
        if handle.await.unwrap().is_loaded() {
            loaded += 1;
        }
    }

    assert!(loaded >= 1);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    assert_eq!(paginator.current_key(), loaded * 2);
}

#[tokio::test]
async fn test_callbacks_see_cleared_guard() {
    let probe: Arc<OnceLock<Weak<DefaultPaginator<u32, char>>>> = Arc::new(OnceLock::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let paginator = Arc::new(
        DefaultPaginator::builder(0u32)
            .on_fetch_page(|key| async move {
                if key == 0 {
                    FetchResult::success(vec!['a'])
                } else {
                    FetchResult::failure(None)
                }
            })
            .compute_next_key(|_items: &[char]| 1)
            .on_page_loaded({
                let probe = probe.clone();
                let seen = seen.clone();
                move |_, _| {
                    if let Some(p) = probe.get().and_then(Weak::upgrade) {
                        seen.lock().unwrap().push(p.is_making_request());
                    }
                }
            })
            .on_error({
                let probe = probe.clone();
                let seen = seen.clone();
                move |_| {
                    if let Some(p) = probe.get().and_then(Weak::upgrade) {
                        seen.lock().unwrap().push(p.is_making_request());
                    }
                }
            })
            .build()
            .unwrap(),
    );
    probe.set(Arc::downgrade(&paginator)).unwrap();

    paginator.load_next_items().await;
    paginator.load_next_items().await;

    assert_eq!(*seen.lock().unwrap(), vec![false, false]);
}

// ============================================================================
// Cancellation and Timeout Tests
// ============================================================================

#[tokio::test]
async fn test_cancelled_fetch_keeps_key() {
    let log = Log::default();
    let loading_log = log.clone();
    let error_log = log.clone();

    let paginator = DefaultPaginator::builder(7u32)
        .on_fetch_page(|_key| std::future::pending::<FetchResult<Vec<char>>>())
        .compute_next_key(|_items: &[char]| 99)
        .on_loading_state_changed(move |l| loading_log.lock().unwrap().push(Event::Loading(l)))
        .on_error(move |m| {
            error_log
                .lock()
                .unwrap()
                .push(Event::Error(m.map(|m| m.to_string())));
        })
        .build()
        .unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let outcome = paginator.load_next_items_with_cancel(&token).await;

    assert_eq!(outcome, LoadOutcome::Cancelled);
    assert_eq!(paginator.current_key(), 7);
    assert!(!paginator.is_making_request());
    assert_eq!(take(&log), vec![Event::Loading(true), Event::Loading(false)]);
}

#[tokio::test]
async fn test_uncancelled_token_loads_normally() {
    let paginator = DefaultPaginator::builder(0u32)
        .on_fetch_page(|_key| async { FetchResult::success(vec!['a', 'b']) })
        .compute_next_key_from(offset_key_u32)
        .build()
        .unwrap();

    let token = CancellationToken::new();
    let outcome = paginator.load_next_items_with_cancel(&token).await;
    assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });
    assert_eq!(paginator.current_key(), 2);
}

fn offset_key_u32(key: &u32, items: &[char]) -> u32 {
    key + items.len() as u32
}

#[tokio::test]
async fn test_timeout_reports_error() {
    let errors = Arc::new(Mutex::new(Vec::new()));

    let paginator = DefaultPaginator::builder(3u32)
        .config(&PaginatorConfig {
            fetch_timeout_ms: Some(20),
        })
        .on_fetch_page(|_key| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            FetchResult::success(vec!['x'])
        })
        .compute_next_key(|_items: &[char]| 4)
        .on_error({
            let errors = errors.clone();
            move |m| errors.lock().unwrap().push(m)
        })
        .build()
        .unwrap();

    let outcome = paginator.load_next_items().await;

    assert_eq!(outcome, LoadOutcome::TimedOut);
    assert!(outcome.is_error());
    assert_eq!(paginator.current_key(), 3);
    assert_eq!(
        *errors.lock().unwrap(),
        vec![Some(UiText::dynamic("Request timeout after 20ms"))]
    );
}

// ============================================================================
// Construction Tests
// ============================================================================

#[tokio::test]
async fn test_new_with_full_strategy_set() {
    let log = Log::default();
    let (a, b) = (log.clone(), log.clone());

    let paginator = DefaultPaginator::new(
        0u32,
        move |l| a.lock().unwrap().push(Event::Loading(l)),
        |_key| async { FetchResult::success(vec!['z']) },
        |_items: &[char]| 10,
        |_| {},
        move |items, key| b.lock().unwrap().push(Event::Loaded(items, key)),
    );

    paginator.load_next_items().await;
    assert_eq!(
        take(&log),
        vec![
            Event::Loading(true),
            Event::Loaded(vec!['z'], 10),
            Event::Loading(false),
        ]
    );
}

#[test]
fn test_builder_requires_fetch() {
    let err = DefaultPaginator::<u32, char>::builder(0)
        .compute_next_key(|_items: &[char]| 1)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::MissingStrategy { name: "on_fetch_page" }));
}

#[test]
fn test_builder_requires_next_key() {
    let err = DefaultPaginator::<u32, char>::builder(0)
        .on_fetch_page(|_key| async { FetchResult::success(Vec::new()) })
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingStrategy {
            name: "compute_next_key"
        }
    ));
}

// ============================================================================
// Strategy Tests
// ============================================================================

#[test]
fn test_offset_key() {
    let next = offset_key::<&str>();
    assert_eq!(next(&0, &["a", "b", "c"]), 3);
    assert_eq!(next(&3, &[]), 3);
}

#[test]
fn test_offset_key_saturates() {
    let next = offset_key::<&str>();
    assert_eq!(next(&(u64::MAX - 1), &["a", "b", "c"]), u64::MAX);
}

#[test]
fn test_page_number_key() {
    let next = page_number_key::<i32>();
    assert_eq!(next(&1, &[10, 20]), 2);
    assert_eq!(next(&2, &[]), 3);
}

#[test]
fn test_page_number_key_saturates() {
    let next = page_number_key::<i32>();
    assert_eq!(next(&u32::MAX, &[1]), u32::MAX);
}

#[test]
fn test_last_item_key() {
    let next = last_item_key(|item: &(u32, &'static str)| item.1.to_string());
    assert_eq!(next(&"start".to_string(), &[(1, "obj_1"), (2, "obj_2")]), "obj_2");
    assert_eq!(next(&"obj_2".to_string(), &[]), "obj_2");
}

// ============================================================================
// LoadOutcome / EndCondition Tests
// ============================================================================

#[test]
fn test_load_outcome_predicates() {
    assert!(LoadOutcome::Loaded { count: 0 }.is_loaded());
    assert!(LoadOutcome::Skipped.is_skipped());
    assert!(LoadOutcome::Failed.is_error());
    assert!(!LoadOutcome::Cancelled.is_error());
}

// `test_case` expands to the std `assert_eq!`, so these cases live outside
// the `pretty_assertions` import.
mod end_condition {
    use crate::pagination::EndCondition;
    use test_case::test_case;

    #[test_case(EndCondition::EmptyPage, 0 => true ; "empty page ends")]
    #[test_case(EndCondition::EmptyPage, 3 => false ; "non-empty page continues")]
    #[test_case(EndCondition::ShortPage { page_size: 10 }, 9 => true ; "short page ends")]
    #[test_case(EndCondition::ShortPage { page_size: 10 }, 10 => false ; "full page continues")]
    #[test_case(EndCondition::ShortPage { page_size: 10 }, 0 => true ; "empty short page ends")]
    fn test_end_condition(condition: EndCondition, count: usize) -> bool {
        condition.is_end(count)
    }
}

// ============================================================================
// PaginationState Tests
// ============================================================================

#[test]
fn test_pagination_state_default() {
    let state = PaginationState::<i32>::new();
    assert!(!state.is_loading);
    assert!(state.items.is_empty());
    assert!(state.error.is_none());
    assert!(!state.end_reached);
    assert_eq!(state.page, 0);
    assert!(state.is_initial_load);
    assert!(!state.is_empty);
    assert!(!state.is_filter_applied);
}

#[test]
fn test_pagination_state_mutations() {
    let mut state = PaginationState::new();

    state.set_loading(true);
    assert!(state.is_loading);

    state.set_error(Some(UiText::dynamic("boom")));
    state.append_page(vec![1, 2], false);
    assert_eq!(state.items, vec![1, 2]);
    assert_eq!(state.page, 1);
    assert!(state.error.is_none());
    assert!(!state.is_initial_load);
    assert!(!state.is_empty);

    state.append_page(Vec::new(), true);
    assert!(state.end_reached);
    assert_eq!(state.page, 2);
    assert!(!state.is_empty);
}

#[test]
fn test_pagination_state_empty_first_page() {
    let mut state = PaginationState::<i32>::new();
    state.append_page(Vec::new(), true);
    assert!(state.is_empty);
    assert!(state.end_reached);
}

#[test]
fn test_pagination_state_clear_keeps_filter() {
    let mut state = PaginationState::new();
    state.is_filter_applied = true;
    state.append_page(vec!['a'], true);

    state.clear();
    assert!(state.items.is_empty());
    assert!(state.is_initial_load);
    assert!(!state.end_reached);
    assert!(state.is_filter_applied);
}
