//! Ledger error types for validation and state errors.

use thiserror::Error;
use tijori_shared::AppError;
use tijori_shared::types::AccountId;

use super::types::EntryStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// A line has both sides set or neither.
    #[error("Line {line} must have exactly one of debit or credit set")]
    InvalidLineSides {
        /// Zero-based line index.
        line: usize,
    },

    /// A line amount is negative.
    #[error("Line {line} amount must be positive")]
    NonPositiveAmount {
        /// Zero-based line index.
        line: usize,
    },

    /// Debits and credits differ.
    #[error("Journal entry is not balanced. Debits: {debits}, Credits: {credits}")]
    Unbalanced {
        /// Total debit amount.
        debits: i64,
        /// Total credit amount.
        credits: i64,
    },

    /// Totals overflowed `i64`.
    #[error("Amount overflow while totalling lines")]
    AmountOverflow,

    /// A reason is required.
    #[error("Reason is required")]
    ReasonRequired,

    /// Reversal reason is shorter than the minimum.
    #[error("Reason must be at least {min} characters, got {actual}")]
    ReasonTooShort {
        /// Minimum length.
        min: usize,
        /// Actual trimmed length.
        actual: usize,
    },

    /// Account code is empty or too long.
    #[error("Invalid account code: {0}")]
    InvalidAccountCode(String),

    /// Account name is blank.
    #[error("Account name is required for account {0}")]
    InvalidAccountName(String),

    /// Currency is not supported.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    // ========== State Errors ==========
    /// Posting attempted on a non-draft entry.
    #[error("entry is not a draft (status: {0})")]
    NotDraft(EntryStatus),

    /// Void/reverse attempted on a non-posted entry.
    #[error("entry is not posted (status: {0})")]
    NotPosted(EntryStatus),

    /// Posting to an inactive account.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::InvalidLineSides { .. } => "INVALID_LINE_SIDES",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::ReasonTooShort { .. } => "REASON_TOO_SHORT",
            Self::InvalidAccountCode(_) => "INVALID_ACCOUNT_CODE",
            Self::InvalidAccountName(_) => "INVALID_ACCOUNT_NAME",
            Self::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            Self::NotDraft(_) => "ENTRY_NOT_DRAFT",
            Self::NotPosted(_) => "ENTRY_NOT_POSTED",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotDraft(_) | LedgerError::NotPosted(_) => Self::Conflict(err.to_string()),
            LedgerError::AccountInactive(_) => Self::BadRequest(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
