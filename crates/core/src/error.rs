//! Error types for the catalog core
//!
//! One taxonomy shared by every layer. Rate-limit denial and not-found
//! are expected outcomes returned as typed errors, never panics; storage
//! failures propagate unchanged with no internal retry.

use crate::cursor::CursorError;
use crate::key::KeyError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the catalog core
#[derive(Debug, Error)]
pub enum Error {
    /// Entity, version, or relation absent
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up ("composition", "attribution", ...)
        kind: String,
        /// The identifier that missed
        id: String,
    },

    /// Duplicate create, or a concurrent-version race lost
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed identifier or key shape
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// Caller-supplied input outside the schema, surfaced before storage
    #[error("validation failed: {0}")]
    Validation(String),

    /// Admission denied; carries the retry-after duration
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimitExceeded {
        /// How long until the window admits another request
        retry_after: Duration,
    },

    /// Backend I/O failure, propagated for the caller to decide on retry
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored row failed to decode; surfaced, never silently corrected
    #[error("corrupt row: {0}")]
    Corruption(String),
}

impl Error {
    /// Shorthand for a not-found outcome
    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    /// True for outcomes a caller is expected to handle in normal flow
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::RateLimitExceeded { .. }
        )
    }
}

impl From<CursorError> for Error {
    fn from(e: CursorError) -> Self {
        Error::Validation(e.to_string())
    }
}

impl From<crate::limits::LimitError> for Error {
    fn from(e: crate::limits::LimitError) -> Self {
        Error::Validation(e.to_string())
    }
}
