//! Wallet domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use tijori_shared::types::{UserId, WalletId};

/// Wallet classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    /// Primary spending wallet.
    Main,
    /// Savings pocket.
    Savings,
    /// Cashback and rewards.
    Rewards,
}

impl WalletType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Savings => "savings",
            Self::Rewards => "rewards",
        }
    }
}

/// Wallet status. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    /// Funds may move.
    Active,
    /// Temporarily blocked.
    Frozen,
    /// Permanently closed.
    Closed,
}

impl WalletStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Frozen => "frozen",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Balance view of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Total funds.
    pub balance: i64,
    /// Funds free to move.
    pub available_balance: i64,
}

impl WalletBalance {
    /// Creates a balance view.
    #[must_use]
    pub const fn new(balance: i64, available_balance: i64) -> Self {
        Self {
            balance,
            available_balance,
        }
    }

    /// Amount earmarked but not yet settled.
    #[must_use]
    pub const fn held(&self) -> i64 {
        self.balance - self.available_balance
    }
}

/// The fields of a locked wallet row that money movement depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSnapshot {
    /// Wallet ID.
    pub id: WalletId,
    /// Owner.
    pub user_id: UserId,
    /// ISO currency code.
    pub currency: String,
    /// Current status.
    pub status: WalletStatus,
    /// Current balances.
    pub balance: WalletBalance,
}
