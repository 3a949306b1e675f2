//! Account balance calculations.
//!
//! - Asset/Expense (debit-normal): balance = debit_total - credit_total
//! - Liability/Equity/Revenue (credit-normal): balance = credit_total - debit_total

use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::{AccountType, NormalSide};

/// Stored balance fields of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Net balance, signed by the account's normal side.
    pub balance: i64,
    /// Sum of all posted debits.
    pub debit_total: i64,
    /// Sum of all posted credits.
    pub credit_total: i64,
}

/// Calculates the balance change a line causes on an account of `account_type`.
#[must_use]
pub const fn balance_change(account_type: AccountType, debit: i64, credit: i64) -> i64 {
    match account_type.normal_side() {
        NormalSide::Debit => debit - credit,
        NormalSide::Credit => credit - debit,
    }
}

impl AccountBalance {
    /// Derives the balance from totals for an account of `account_type`.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if the difference does not fit in `i64`.
    pub fn from_totals(
        account_type: AccountType,
        debit_total: i64,
        credit_total: i64,
    ) -> Result<Self, LedgerError> {
        let balance = match account_type.normal_side() {
            NormalSide::Debit => debit_total.checked_sub(credit_total),
            NormalSide::Credit => credit_total.checked_sub(debit_total),
        }
        .ok_or(LedgerError::AmountOverflow)?;

        Ok(Self {
            balance,
            debit_total,
            credit_total,
        })
    }

    /// Applies one line and returns the new balance fields.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if any total overflows.
    pub fn apply(
        self,
        account_type: AccountType,
        debit: i64,
        credit: i64,
    ) -> Result<Self, LedgerError> {
        let debit_total = self
            .debit_total
            .checked_add(debit)
            .ok_or(LedgerError::AmountOverflow)?;
        let credit_total = self
            .credit_total
            .checked_add(credit)
            .ok_or(LedgerError::AmountOverflow)?;
        Self::from_totals(account_type, debit_total, credit_total)
    }

    /// Returns true if `balance` agrees with the totals for this account type.
    #[must_use]
    pub fn is_consistent(&self, account_type: AccountType) -> bool {
        Self::from_totals(account_type, self.debit_total, self.credit_total)
            .is_ok_and(|derived| derived.balance == self.balance)
    }
}
