//! Result types

use crate::error::{Error, Result};
use crate::text::UiText;

/// Outcome of an asynchronous fetch
///
/// Exactly one of [`on_success`](Self::on_success),
/// [`on_failure`](Self::on_failure) and [`on_loading`](Self::on_loading)
/// fires for any value, so they can be chained freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkResult<T> {
    /// The fetch produced a value
    Success(T),
    /// The fetch is still in flight
    Loading,
    /// The fetch failed, optionally with a description
    Failure(Option<UiText>),
}

impl<T> NetworkResult<T> {
    /// Create a success
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Create a failure with an optional description
    pub fn failure(message: Option<UiText>) -> Self {
        Self::Failure(message)
    }

    /// Create a failure described by the given text
    pub fn failure_text(message: impl Into<UiText>) -> Self {
        Self::Failure(Some(message.into()))
    }

    /// Run `callback` with the value if this is a success
    pub fn on_success<F: FnOnce(&T)>(&self, callback: F) -> &Self {
        if let Self::Success(value) = self {
            callback(value);
        }
        self
    }

    /// Run `callback` with the description if this is a failure
    pub fn on_failure<F: FnOnce(Option<&UiText>)>(&self, callback: F) -> &Self {
        if let Self::Failure(message) = self {
            callback(message.as_ref());
        }
        self
    }

    /// Run `callback` if the fetch is still loading
    pub fn on_loading<F: FnOnce()>(&self, callback: F) -> &Self {
        if matches!(self, Self::Loading) {
            callback();
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Map the success value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> NetworkResult<U> {
        match self {
            Self::Success(value) => NetworkResult::Success(f(value)),
            Self::Loading => NetworkResult::Loading,
            Self::Failure(message) => NetworkResult::Failure(message),
        }
    }

    /// Narrow to a settled result, rejecting `Loading`
    pub fn into_fetch_result(self) -> Result<FetchResult<T>> {
        FetchResult::try_from(self)
    }
}

/// Settled outcome of a page fetch
///
/// Fetch functions given to a paginator return this type so that the
/// in-progress state can never reach the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult<T> {
    /// The page was fetched
    Success(T),
    /// The fetch failed, optionally with a description
    Failure(Option<UiText>),
}

impl<T> FetchResult<T> {
    /// Create a success
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Create a failure with an optional description
    pub fn failure(message: Option<UiText>) -> Self {
        Self::Failure(message)
    }

    /// Create a failure described by the given text
    pub fn failure_text(message: impl Into<UiText>) -> Self {
        Self::Failure(Some(message.into()))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Map the success value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchResult<U> {
        match self {
            Self::Success(value) => FetchResult::Success(f(value)),
            Self::Failure(message) => FetchResult::Failure(message),
        }
    }
}

impl<T> From<FetchResult<T>> for NetworkResult<T> {
    fn from(result: FetchResult<T>) -> Self {
        match result {
            FetchResult::Success(value) => Self::Success(value),
            FetchResult::Failure(message) => Self::Failure(message),
        }
    }
}

impl<T> TryFrom<NetworkResult<T>> for FetchResult<T> {
    type Error = Error;

    fn try_from(result: NetworkResult<T>) -> Result<Self> {
        match result {
            NetworkResult::Success(value) => Ok(Self::Success(value)),
            NetworkResult::Failure(message) => Ok(Self::Failure(message)),
            NetworkResult::Loading => Err(Error::UnsettledResult),
        }
    }
}

impl<T> From<Result<T>> for FetchResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(Some(UiText::from(&err))),
        }
    }
}
