//! Ledger domain types for the chart of accounts and journal entries.
//!
//! This module defines the core types used for creating, validating and
//! posting journal entries in the double-entry bookkeeping system.

use serde::{Deserialize, Serialize};
use std::fmt;
use tijori_shared::types::{AccountId, UserId};

/// Maximum length of an account code.
pub const MAX_ACCOUNT_CODE_LEN: usize = 50;

/// Minimum length of the reason given when reversing an entry.
pub const MIN_REVERSAL_REASON_LEN: usize = 10;

/// Which side of the ledger increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Balance grows with debits (assets, expenses).
    Debit,
    /// Balance grows with credits (liabilities, equity, revenue).
    Credit,
}

/// Account classification.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account.
    Asset,
    /// Liability account.
    Liability,
    /// Equity account.
    Equity,
    /// Revenue account.
    Revenue,
    /// Expense account.
    Expense,
}

impl AccountType {
    /// Returns the side that increases this account's balance.
    #[must_use]
    pub const fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }

    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account accepts postings.
    Active,
    /// Account is retired; postings are rejected.
    Inactive,
}

/// Journal entry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalEntryType {
    /// Day-to-day entry.
    Standard,
    /// Opening balances.
    Opening,
    /// Period close.
    Closing,
    /// Correction of a prior period.
    Adjusting,
    /// Generated by reversing a posted entry.
    Reversing,
}

/// Journal entry lifecycle status.
///
/// The valid transitions are:
/// - Draft → Posted (post)
/// - Posted → Voided (void, audit marker only)
/// - Posted → Reversed (reverse, books a swapped entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Editable; no balances affected yet.
    Draft,
    /// Applied to account balances.
    Posted,
    /// Marked void for audit purposes.
    Voided,
    /// Cancelled by a linked reversing entry.
    Reversed,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Voided => "voided",
            Self::Reversed => "reversed",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Voided | Self::Reversed)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for a single journal line.
///
/// Exactly one of `debit_amount` / `credit_amount` must be positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount in minor units (0 if credit).
    pub debit_amount: i64,
    /// Credit amount in minor units (0 if debit).
    pub credit_amount: i64,
    /// Optional line description.
    pub description: Option<String>,
}

impl LineInput {
    /// A debit line.
    #[must_use]
    pub const fn debit(account_id: AccountId, amount: i64) -> Self {
        Self {
            account_id,
            debit_amount: amount,
            credit_amount: 0,
            description: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub const fn credit(account_id: AccountId, amount: i64) -> Self {
        Self {
            account_id,
            debit_amount: 0,
            credit_amount: amount,
            description: None,
        }
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    /// Entry classification.
    pub entry_type: JournalEntryType,
    /// Description of the entry.
    pub description: String,
    /// External correlation reference.
    pub reference: Option<String>,
    /// The lines (at least two, balanced).
    pub lines: Vec<LineInput>,
    /// The user creating the entry.
    pub created_by: UserId,
}

/// Input for creating a chart-of-accounts entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Unique account code (≤ 50 characters).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// ISO currency code.
    pub currency: String,
    /// Optional parent account.
    pub parent_id: Option<AccountId>,
}

/// Account as seen through the ledger port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// ISO currency code.
    pub currency: String,
    /// Account status.
    pub status: AccountStatus,
}

/// Formats the human-readable entry number for a sequence value.
#[must_use]
pub fn format_entry_number(sequence: i64) -> String {
    format!("JE-{sequence:08}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_sides() {
        assert_eq!(AccountType::Asset.normal_side(), NormalSide::Debit);
        assert_eq!(AccountType::Expense.normal_side(), NormalSide::Debit);
        assert_eq!(AccountType::Liability.normal_side(), NormalSide::Credit);
        assert_eq!(AccountType::Equity.normal_side(), NormalSide::Credit);
        assert_eq!(AccountType::Revenue.normal_side(), NormalSide::Credit);
    }

    #[test]
    fn test_account_type_parse() {
        assert_eq!(AccountType::parse("LIABILITY"), Some(AccountType::Liability));
        assert_eq!(AccountType::parse("nope"), None);
        assert_eq!(AccountType::Revenue.to_string(), "revenue");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!EntryStatus::Draft.is_terminal());
        assert!(!EntryStatus::Posted.is_terminal());
        assert!(EntryStatus::Voided.is_terminal());
        assert!(EntryStatus::Reversed.is_terminal());
    }

    #[test]
    fn test_entry_number_format() {
        assert_eq!(format_entry_number(1), "JE-00000001");
        assert_eq!(format_entry_number(123_456_789), "JE-123456789");
    }
}
