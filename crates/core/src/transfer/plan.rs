//! Validation and balance computation for money movements.

use crate::wallet::rules::ensure_active;
use crate::wallet::{WalletBalance, WalletSnapshot};

use super::error::TransferError;

/// New balances for both sides of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    /// Source balance after the debit.
    pub source: WalletBalance,
    /// Destination balance after the credit.
    pub destination: WalletBalance,
}

fn ensure_positive(amount: i64) -> Result<(), TransferError> {
    if amount <= 0 {
        return Err(TransferError::InvalidAmount(amount));
    }
    Ok(())
}

/// Validates a transfer between two locked wallets.
///
/// Checks run in order: amount, distinct wallets, both active, same
/// currency, sufficient available balance.
///
/// # Errors
///
/// Returns the first failed check.
pub fn validate_transfer(
    source: &WalletSnapshot,
    destination: &WalletSnapshot,
    amount: i64,
) -> Result<(), TransferError> {
    ensure_positive(amount)?;
    if source.id == destination.id {
        return Err(TransferError::SameWallet);
    }
    ensure_active(source)?;
    ensure_active(destination)?;
    if source.currency != destination.currency {
        return Err(TransferError::CurrencyMismatch {
            source_currency: source.currency.clone(),
            destination_currency: destination.currency.clone(),
        });
    }
    source.balance.ensure_available(amount)?;
    Ok(())
}

/// Validates a transfer and computes the resulting balances.
///
/// # Errors
///
/// See [`validate_transfer`]; also fails if the destination would overflow.
pub fn plan_transfer(
    source: &WalletSnapshot,
    destination: &WalletSnapshot,
    amount: i64,
) -> Result<TransferPlan, TransferError> {
    validate_transfer(source, destination, amount)?;
    Ok(TransferPlan {
        source: source.balance.debit(amount)?,
        destination: destination.balance.credit(amount)?,
    })
}

/// Validates a deposit into a locked wallet and returns its new balance.
///
/// # Errors
///
/// Returns an error for a non-positive amount or an inactive wallet.
pub fn plan_deposit(wallet: &WalletSnapshot, amount: i64) -> Result<WalletBalance, TransferError> {
    ensure_positive(amount)?;
    ensure_active(wallet)?;
    Ok(wallet.balance.credit(amount)?)
}

/// Validates a withdrawal from a locked wallet and returns its new balance.
///
/// # Errors
///
/// Returns an error for a non-positive amount, an inactive wallet, or
/// insufficient available balance.
pub fn plan_withdrawal(
    wallet: &WalletSnapshot,
    amount: i64,
) -> Result<WalletBalance, TransferError> {
    ensure_positive(amount)?;
    ensure_active(wallet)?;
    Ok(wallet.balance.debit(amount)?)
}
