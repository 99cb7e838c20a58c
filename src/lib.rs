// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]
#![allow(clippy::type_complexity)]

//! # pagewise
//!
//! A small, Rust-native controller for cursor-based paginated loading.
//!
//! ## Features
//!
//! - **Single in-flight fetch**: overlapping "load more" signals collapse into one request
//! - **Any key type**: offsets, page numbers, continuation tokens
//! - **Errors as values**: failures arrive through a callback, never as a panic or `Err`
//! - **Cancellation and timeouts**: abandon a stuck fetch without losing your place
//! - **Observable state**: a feed publishes a list snapshot for a view layer
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewise::pagination::{DefaultPaginator, Paginator};
//! use pagewise::result::FetchResult;
//!
//! #[tokio::main]
//! async fn main() -> pagewise::Result<()> {
//!     let paginator = DefaultPaginator::builder(0u32)
//!         .on_fetch_page(|page| async move { FetchResult::success(fetch_page(page).await) })
//!         .compute_next_key_from(|page, _items| page + 1)
//!         .on_page_loaded(|items, next| println!("{} items, next page {next}", items.len()))
//!         .on_error(|message| eprintln!("failed: {message:?}"))
//!         .build()?;
//!
//!     paginator.load_next_items().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Feed (observable state)                   │
//! │   load_more() → refresh() → subscribe() → PaginationState    │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │                       DefaultPaginator                       │
//! │  in-flight guard · current key · timeout · cancellation      │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴───────────┬───────────────────┐
//! │ NetworkResult│   Next-key strategies    │   Page sources    │
//! ├──────────────┼──────────────────────────┼───────────────────┤
//! │ Success      │ Offset                   │ JSON file         │
//! │ Loading      │ Page number              │ HTTP endpoint     │
//! │ Failure      │ Last-item cursor         │                   │
//! └──────────────┴──────────────────────────┴───────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document struct fields and error variants before 1.0

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Localizable failure text
pub mod text;

/// Fetch outcomes and safe-call wrappers
pub mod result;

/// Paginator controller and next-key strategies
pub mod pagination;

/// Observable paginated lists
pub mod feed;

/// Ready-made page sources
pub mod source;

/// Configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use feed::Feed;
pub use pagination::{DefaultPaginator, LoadOutcome, PaginationState, Paginator};
pub use result::{FetchResult, NetworkResult};
pub use text::UiText;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
