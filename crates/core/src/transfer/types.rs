//! Transaction keys and receipts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::TransferError;

/// Maximum length of a caller-supplied transaction id.
pub const MAX_TRANSACTION_KEY_LEN: usize = 128;

/// The kind of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Wallet to wallet.
    Transfer,
    /// Funds in.
    Deposit,
    /// Funds out.
    Withdrawal,
}

impl OperationKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionKey(String);

impl TransactionKey {
    /// Parses a key: trimmed, non-empty, at most 128 characters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransactionKey` otherwise.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, TransferError> {
        let key = raw.as_ref().trim();
        if key.is_empty() || key.chars().count() > MAX_TRANSACTION_KEY_LEN {
            return Err(TransferError::InvalidTransactionKey(key.to_string()));
        }
        Ok(Self(key.to_string()))
    }

    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a processor operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// What was done.
    pub kind: OperationKind,
    /// The idempotency key.
    pub transaction_id: TransactionKey,
    /// Amount moved, in minor units.
    pub amount: i64,
    /// True if the key had already been processed and nothing changed.
    pub replayed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_trimmed() {
        assert_eq!(TransactionKey::parse("  t1 ").unwrap().as_str(), "t1");
    }

    #[test]
    fn test_key_bounds() {
        assert!(TransactionKey::parse("   ").is_err());
        assert!(TransactionKey::parse("k".repeat(128)).is_ok());
        assert!(matches!(
            TransactionKey::parse("k".repeat(129)),
            Err(TransferError::InvalidTransactionKey(_))
        ));
    }

    #[test]
    fn test_receipt_serializes_amount_as_integer() {
        let receipt = Receipt {
            kind: OperationKind::Transfer,
            transaction_id: TransactionKey::parse("t1").unwrap(),
            amount: 20_000,
            replayed: false,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["amount"], 20_000);
        assert_eq!(json["kind"], "transfer");
        assert_eq!(json["transaction_id"], "t1");
    }
}
