//! Error types for wikiwalk.
//!
//! Two layers: [`FetchError`] is what a [`NeighborSource`](crate::source::NeighborSource)
//! reports for a single title, [`WalkError`] is what a walk reports to its caller.
//! Only start-node failures and internal inconsistencies become a `WalkError`;
//! neighbor failures are absorbed by the engine.

use thiserror::Error;

/// Failure to fetch one title from a neighbor source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The title does not exist.
    #[error("page does not exist: {0}")]
    NotFound(String),

    /// The title exists but is outside the traversable node space.
    #[error("page is not eligible for traversal: {0}")]
    Ineligible(String),

    /// Any I/O, protocol or decoding fault.
    #[error("transient fetch error: {0}")]
    Transient(String),
}

impl FetchError {
    /// Whether retrying the same request could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[cfg(feature = "mediawiki")]
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transient(err.to_string())
    }
}

#[cfg(feature = "mediawiki")]
impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transient(format!("malformed response: {err}"))
    }
}

/// Hard failure of a walk.
///
/// "No path" is not an error: [`Walker::walk`](crate::Walker::walk) returns `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    /// The start title does not exist.
    #[error("start page does not exist: {0}")]
    StartNotFound(String),

    /// The start title is not a traversable content page.
    #[error("start page is not eligible for traversal: {0}")]
    StartIneligible(String),

    /// The start title could not be fetched.
    #[error("start page {title} is unavailable: {source}")]
    StartUnavailable {
        /// Requested start title.
        title: String,
        /// Underlying fetch failure.
        source: FetchError,
    },

    /// Parent chain in the node registry is malformed.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl WalkError {
    /// Map a fetch failure of the start title onto the walk taxonomy.
    pub(crate) fn from_start(title: &str, err: FetchError) -> Self {
        match err {
            FetchError::NotFound(_) => Self::StartNotFound(title.to_string()),
            FetchError::Ineligible(_) => Self::StartIneligible(title.to_string()),
            FetchError::Transient(_) => Self::StartUnavailable {
                title: title.to_string(),
                source: err,
            },
        }
    }
}

/// Result type alias for walk operations.
pub type Result<T> = std::result::Result<T, WalkError>;
