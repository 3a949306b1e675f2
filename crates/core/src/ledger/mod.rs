//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger rules:
//! - Domain types for accounts, entries, and lines
//! - Line and balance validation
//! - Account balance arithmetic by normal side
//! - The journal entry lifecycle state machine
//! - Reversing entry construction

pub mod balance;
pub mod error;
pub mod lifecycle;
pub mod reversal;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use balance::{AccountBalance, balance_change};
pub use error::LedgerError;
pub use lifecycle::{EntryLifecycle, EntryTransition};
pub use reversal::{reversal_description, reversing_lines};
pub use types::{
    AccountStatus, AccountType, EntryStatus, JournalEntryType, LedgerAccount, LineInput,
    NewAccount, NewJournalEntry, NormalSide, format_entry_number,
};
pub use validation::{EntryTotals, validate_lines, validate_new_account};
