//! Result module
//!
//! Outcome of one asynchronous unit of work, passed around as a value
//! instead of an error travelling up the call stack.
//!
//! # Overview
//!
//! - [`NetworkResult`] - success, in-progress or failure
//! - [`FetchResult`] - the settled subset handed back to a paginator
//! - [`try_api_call`] / [`try_api_call_with_catch`] - turn errors and panics
//!   raised while producing a result into a failure

mod call;
mod types;

pub use call::{try_api_call, try_api_call_with_catch, try_fetch};
pub use types::{FetchResult, NetworkResult};
