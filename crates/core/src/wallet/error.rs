//! Wallet error types.

use thiserror::Error;
use tijori_shared::AppError;
use tijori_shared::types::WalletId;

use super::types::WalletStatus;

/// Errors raised by wallet rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Wallet is not active.
    #[error("Wallet {wallet_id} is {status}, not active")]
    Inactive {
        /// The wallet.
        wallet_id: WalletId,
        /// Its current status.
        status: WalletStatus,
    },

    /// Wallet is already closed.
    #[error("Wallet {0} is already closed")]
    AlreadyClosed(WalletId),

    /// Status change not allowed through `update_status`.
    #[error("Cannot change wallet status from {from} to {to}")]
    IllegalStatusChange {
        /// Current status.
        from: WalletStatus,
        /// Requested status.
        to: WalletStatus,
    },

    /// Wallet still holds funds.
    #[error("Wallet still holds a balance of {balance}")]
    CloseWithBalance {
        /// Remaining balance.
        balance: i64,
    },

    /// Not enough available funds.
    #[error("insufficient balance: available {available}, requested {requested}, short by {}", .requested - .available)]
    InsufficientBalance {
        /// Available balance.
        available: i64,
        /// Requested amount.
        requested: i64,
    },

    /// Releasing more than is held.
    #[error("Cannot release {requested}, only {held} is held")]
    InsufficientHeld {
        /// Currently held.
        held: i64,
        /// Requested release.
        requested: i64,
    },

    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Balance arithmetic overflowed.
    #[error("Wallet balance overflow")]
    Overflow,

    /// Caller does not own the wallet.
    #[error("Wallet {0} does not belong to the caller")]
    NotOwner(WalletId),
}

impl WalletError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Inactive { .. } => "WALLET_INACTIVE",
            Self::AlreadyClosed(_) => "WALLET_CLOSED",
            Self::IllegalStatusChange { .. } => "ILLEGAL_STATUS_CHANGE",
            Self::CloseWithBalance { .. } => "WALLET_NOT_EMPTY",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InsufficientHeld { .. } => "INSUFFICIENT_HELD",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Overflow => "AMOUNT_OVERFLOW",
            Self::NotOwner(_) => "NOT_OWNER",
        }
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::AlreadyClosed(_) | WalletError::IllegalStatusChange { .. } => {
                Self::Conflict(err.to_string())
            }
            WalletError::InvalidAmount(_) | WalletError::Overflow => Self::Validation(err.to_string()),
            WalletError::NotOwner(_) => Self::Forbidden(err.to_string()),
            WalletError::Inactive { .. }
            | WalletError::CloseWithBalance { .. }
            | WalletError::InsufficientBalance { .. }
            | WalletError::InsufficientHeld { .. } => Self::BadRequest(err.to_string()),
        }
    }
}
