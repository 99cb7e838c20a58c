//! Safe-call wrappers
//!
//! Run a fallible future and turn both `Err` and panics into a failure
//! result, so nothing escapes across the async boundary.

use super::types::{FetchResult, NetworkResult};
use crate::error::Error;
use crate::text::UiText;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::debug;

/// Await `block`, converting any error or panic into `Failure`
///
/// The failure carries the error's display text.
pub async fn try_api_call<T, Fut>(block: Fut) -> NetworkResult<T>
where
    Fut: Future<Output = anyhow::Result<NetworkResult<T>>>,
{
    match guarded(block).await {
        Ok(result) => result,
        Err(err) => {
            debug!(error = %err, "API call failed");
            NetworkResult::Failure(Some(UiText::dynamic(err.to_string())))
        }
    }
}

/// Await `block`, handing any error or panic to `catch` instead
pub async fn try_api_call_with_catch<T, Fut, C, CFut>(block: Fut, catch: C) -> NetworkResult<T>
where
    Fut: Future<Output = anyhow::Result<NetworkResult<T>>>,
    C: FnOnce(anyhow::Error) -> CFut,
    CFut: Future<Output = NetworkResult<T>>,
{
    match guarded(block).await {
        Ok(result) => result,
        Err(err) => {
            debug!(error = %err, "API call failed, running catch handler");
            catch(err).await
        }
    }
}

/// Await a plain fallible fetch and settle it into a [`FetchResult`]
pub async fn try_fetch<T, Fut>(block: Fut) -> FetchResult<T>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    match guarded(block).await {
        Ok(value) => FetchResult::Success(value),
        Err(err) => {
            debug!(error = %err, "Page fetch failed");
            FetchResult::Failure(Some(UiText::dynamic(err.to_string())))
        }
    }
}

async fn guarded<T, Fut>(block: Fut) -> anyhow::Result<T>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    match AssertUnwindSafe(block).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(Error::panicked(panic_message(payload.as_ref())).into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
