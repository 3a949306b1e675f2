//! Business rule validation for ledger operations.

use std::str::FromStr;

use tijori_shared::types::Currency;

use super::error::LedgerError;
use super::types::{LineInput, MAX_ACCOUNT_CODE_LEN, MIN_REVERSAL_REASON_LEN, NewAccount};

/// Debit and credit sums of a validated set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTotals {
    /// Total debit amount.
    pub debits: i64,
    /// Total credit amount.
    pub credits: i64,
}

impl EntryTotals {
    /// Returns true if debits equal credits.
    #[must_use]
    pub const fn is_balanced(&self) -> bool {
        self.debits == self.credits
    }
}

/// Checks a single line: exactly one side set, and that side positive.
///
/// # Errors
///
/// Returns an error naming the line index if the line is malformed.
pub fn validate_line(index: usize, line: &LineInput) -> Result<(), LedgerError> {
    if line.debit_amount < 0 || line.credit_amount < 0 {
        return Err(LedgerError::NonPositiveAmount { line: index });
    }
    match (line.debit_amount > 0, line.credit_amount > 0) {
        (true, false) | (false, true) => Ok(()),
        _ => Err(LedgerError::InvalidLineSides { line: index }),
    }
}

/// Validates that a set of journal lines is well formed and balanced.
///
/// # Errors
///
/// Returns an error if there are fewer than two lines, any line is malformed,
/// the totals overflow, or debits differ from credits.
pub fn validate_lines(lines: &[LineInput]) -> Result<EntryTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    let mut debits: i64 = 0;
    let mut credits: i64 = 0;

    for (index, line) in lines.iter().enumerate() {
        validate_line(index, line)?;
        debits = debits
            .checked_add(line.debit_amount)
            .ok_or(LedgerError::AmountOverflow)?;
        credits = credits
            .checked_add(line.credit_amount)
            .ok_or(LedgerError::AmountOverflow)?;
    }

    let totals = EntryTotals { debits, credits };
    if !totals.is_balanced() {
        return Err(LedgerError::Unbalanced { debits, credits });
    }
    Ok(totals)
}

/// Validates a void reason (non-blank).
///
/// # Errors
///
/// Returns `ReasonRequired` if the reason is blank.
pub fn validate_void_reason(reason: &str) -> Result<(), LedgerError> {
    if reason.trim().is_empty() {
        return Err(LedgerError::ReasonRequired);
    }
    Ok(())
}

/// Validates a reversal reason (at least ten characters after trimming).
///
/// # Errors
///
/// Returns `ReasonTooShort` if the trimmed reason is too short.
pub fn validate_reversal_reason(reason: &str) -> Result<(), LedgerError> {
    let actual = reason.trim().chars().count();
    if actual < MIN_REVERSAL_REASON_LEN {
        return Err(LedgerError::ReasonTooShort {
            min: MIN_REVERSAL_REASON_LEN,
            actual,
        });
    }
    Ok(())
}

/// Validates the fields of a new account.
///
/// # Errors
///
/// Returns an error for an empty or over-long code, a blank name, or an
/// unknown currency.
pub fn validate_new_account(input: &NewAccount) -> Result<(), LedgerError> {
    let code = input.code.trim();
    if code.is_empty() || code.chars().count() > MAX_ACCOUNT_CODE_LEN {
        return Err(LedgerError::InvalidAccountCode(input.code.clone()));
    }
    if input.name.trim().is_empty() {
        return Err(LedgerError::InvalidAccountName(code.to_string()));
    }
    Currency::from_str(&input.currency)
        .map_err(|_| LedgerError::UnsupportedCurrency(input.currency.clone()))?;
    Ok(())
}
