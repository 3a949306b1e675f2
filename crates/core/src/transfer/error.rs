//! Transfer error types.

use thiserror::Error;
use tijori_shared::AppError;

use crate::limits::LimitError;
use crate::wallet::WalletError;

/// Errors raised while planning a money movement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Source and destination are the same wallet.
    #[error("Cannot transfer to the same wallet")]
    SameWallet,

    /// Wallets hold different currencies.
    #[error("currency mismatch: {source_currency} to {destination_currency}")]
    CurrencyMismatch {
        /// Source currency.
        source_currency: String,
        /// Destination currency.
        destination_currency: String,
    },

    /// Transaction key is empty or too long.
    #[error("Invalid transaction id: {0}")]
    InvalidTransactionKey(String),

    /// Wallet rule violated.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Spend limit violated.
    #[error(transparent)]
    Limit(#[from] LimitError),
}

impl TransferError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::SameWallet => "SAME_WALLET",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InvalidTransactionKey(_) => "INVALID_TRANSACTION_ID",
            Self::Wallet(err) => err.error_code(),
            Self::Limit(err) => err.error_code(),
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InvalidAmount(_) | TransferError::InvalidTransactionKey(_) => {
                Self::Validation(err.to_string())
            }
            TransferError::SameWallet | TransferError::CurrencyMismatch { .. } => {
                Self::BadRequest(err.to_string())
            }
            TransferError::Wallet(err) => err.into(),
            TransferError::Limit(err) => err.into(),
        }
    }
}
