//! Pagination module
//!
//! Supports: Offset, Page Number and Cursor keys through one controller
//!
//! # Overview
//!
//! The pagination module drives "fetch the next page" for any keyed data
//! source. [`DefaultPaginator`] owns the current key and the in-flight
//! guard; everything else (fetching, deriving the next key, reacting to
//! results) is injected as functions.

mod paginator;
mod strategies;
mod types;

pub use paginator::{DefaultPaginator, PaginatorBuilder};
pub use strategies::{last_item_key, offset_key, page_number_key};
pub use types::{
    EndCondition, ErrorFn, FetchPageFn, LoadOutcome, LoadingFn, NextKeyFn, PageLoadedFn,
    PaginationState, Paginator,
};

#[cfg(test)]
mod tests;
