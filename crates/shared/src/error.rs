//! Application-wide error types.
//!
//! Every crate converts its own error enum into [`AppError`] at the boundary,
//! so callers only ever see this taxonomy and never a driver-specific shape.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Input failed validation (unbalanced lines, malformed sides, short reason).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (duplicate key or illegal state transition).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request cannot be honoured in the current state of the wallet.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Caller does not own the resource.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The operation did not finish before its deadline and was rolled back.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Timeout(_) => 503,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Timeout(_) => "TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if retrying the same request may succeed.
    ///
    /// Nothing is ever partially committed, so a timed-out operation can be
    /// replayed with the same idempotency key.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns the human-readable message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::BadRequest(m)
            | Self::Forbidden(m)
            | Self::Timeout(m)
            | Self::Database(m)
            | Self::Internal(m) => m,
        }
    }
}
