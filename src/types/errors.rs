//! Application error types.
//!
//! All errors use `thiserror` for automatic `Error` trait derivation. The
//! variants mirror the error taxonomy every subsystem agrees on: callers that
//! sit behind an HTTP layer can map `status_code_hint()` onto a status code
//! without this crate depending on any particular web framework.

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad input / strict-mode validation failure (HTTP 400 class).
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested name has no config/registration (client error, not retried).
    #[error("not found: {0}")]
    NotFound(String),

    /// Feature or capability gated off (HTTP 501 class).
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Recoverable error from a single provider/formatter attempt; consumed
    /// by a fallback or retry loop rather than surfaced directly.
    #[error("transient error: {0}")]
    Transient(String),

    /// Rate or quota exhaustion.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),

    /// Cancellation propagated from an ambient cancellation token.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Deadline exceeded (formatter/provider timeout).
    #[error("timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport errors from a provider's HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse HTTP status class a caller-facing layer would use, per §7's
/// error taxonomy. This crate never constructs an HTTP response itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHint {
    BadRequest,
    NotFound,
    NotImplemented,
    TooManyRequests,
    Internal,
    Cancelled,
    Timeout,
}

impl Error {
    pub fn status_hint(&self) -> StatusHint {
        match self {
            Error::Validation(_) => StatusHint::BadRequest,
            Error::NotFound(_) => StatusHint::NotFound,
            Error::NotSupported(_) => StatusHint::NotImplemented,
            Error::QuotaExceeded(_) => StatusHint::TooManyRequests,
            Error::Cancelled(_) => StatusHint::Cancelled,
            Error::Timeout(_) => StatusHint::Timeout,
            Error::Transient(_) | Error::Internal(_) | Error::Serialization(_) | Error::Http(_) | Error::Io(_) => {
                StatusHint::Internal
            }
        }
    }

    /// True for errors a fallback/retry loop should treat as recoverable.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_) | Error::Timeout(_) | Error::Http(_))
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn quota_exceeded(msg: impl Into<String>) -> Self {
        Self::QuotaExceeded(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}
