//! Human-readable text carried by failures
//!
//! A failure description is either a ready string (usually an error's
//! display text) or a resource key plus arguments that the host's
//! localization layer resolves. Without such a layer, a resource renders
//! as its key followed by its arguments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional, localizable error description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiText {
    /// Text that is already final
    Dynamic { text: String },
    /// Text to be looked up by key
    Resource {
        key: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
    },
}

impl UiText {
    /// Create dynamic text
    pub fn dynamic(text: impl Into<String>) -> Self {
        Self::Dynamic { text: text.into() }
    }

    /// Create a resource reference without arguments
    pub fn resource(key: impl Into<String>) -> Self {
        Self::Resource {
            key: key.into(),
            args: Vec::new(),
        }
    }

    /// Add a formatting argument to a resource reference
    ///
    /// Dynamic text is returned unchanged.
    #[must_use]
    pub fn with_arg(self, arg: impl Into<String>) -> Self {
        match self {
            Self::Resource { key, mut args } => {
                args.push(arg.into());
                Self::Resource { key, args }
            }
            other => other,
        }
    }

    /// Resolve to a string using a lookup for resource keys
    ///
    /// `lookup` returns a template for a key; `{0}`, `{1}`, ... are replaced
    /// by the arguments. Unknown keys fall back to [`Display`](fmt::Display).
    pub fn resolve<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            Self::Dynamic { text } => text.clone(),
            Self::Resource { key, args } => match lookup(key) {
                Some(template) => args
                    .iter()
                    .enumerate()
                    .fold(template, |acc, (i, arg)| acc.replace(&format!("{{{i}}}"), arg)),
                None => self.to_string(),
            },
        }
    }
}

impl fmt::Display for UiText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic { text } => f.write_str(text),
            Self::Resource { key, args } if args.is_empty() => f.write_str(key),
            Self::Resource { key, args } => write!(f, "{key}({})", args.join(", ")),
        }
    }
}

impl From<String> for UiText {
    fn from(text: String) -> Self {
        Self::Dynamic { text }
    }
}

impl From<&str> for UiText {
    fn from(text: &str) -> Self {
        Self::dynamic(text)
    }
}

impl From<&crate::Error> for UiText {
    fn from(err: &crate::Error) -> Self {
        Self::dynamic(err.to_string())
    }
}
