//! Limit error types.

use thiserror::Error;
use tijori_shared::AppError;

/// Errors raised by the limit manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Amount exceeds what is left of the daily limit.
    #[error("Amount {requested} exceeds daily limit, remaining {remaining}")]
    DailyExceeded {
        /// Left in the current day.
        remaining: i64,
        /// Requested amount.
        requested: i64,
    },

    /// Amount exceeds what is left of the monthly limit.
    #[error("Amount {requested} exceeds monthly limit, remaining {remaining}")]
    MonthlyExceeded {
        /// Left in the current month.
        remaining: i64,
        /// Requested amount.
        requested: i64,
    },

    /// Limits must be positive and monthly must cover daily.
    #[error("Invalid limits: daily {daily}, monthly {monthly}")]
    InvalidLimits {
        /// Requested daily limit.
        daily: i64,
        /// Requested monthly limit.
        monthly: i64,
    },

    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Counter arithmetic overflowed.
    #[error("Spend counter overflow")]
    Overflow,
}

impl LimitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DailyExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            Self::MonthlyExceeded { .. } => "MONTHLY_LIMIT_EXCEEDED",
            Self::InvalidLimits { .. } => "INVALID_LIMITS",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Overflow => "AMOUNT_OVERFLOW",
        }
    }
}

impl From<LimitError> for AppError {
    fn from(err: LimitError) -> Self {
        match err {
            LimitError::DailyExceeded { .. } | LimitError::MonthlyExceeded { .. } => {
                Self::BadRequest(err.to_string())
            }
            LimitError::InvalidLimits { .. }
            | LimitError::InvalidAmount(_)
            | LimitError::Overflow => Self::Validation(err.to_string()),
        }
    }
}
