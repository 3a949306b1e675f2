//! Wallet rules: status transitions, ownership, and balance mutations.
//!
//! All functions are pure; the caller holds the wallet row lock and persists
//! the returned values in the same transaction.

use tijori_shared::types::{UserId, WalletId};

use super::error::WalletError;
use super::types::{WalletBalance, WalletSnapshot, WalletStatus};

/// Validates a status change requested through `update_status`.
///
/// Active and Frozen may be swapped freely; setting the current status again
/// is a no-op. Closing goes through [`validate_close`].
///
/// # Errors
///
/// Returns `AlreadyClosed` if the wallet is closed, `IllegalStatusChange` if
/// `to` is `Closed`.
pub fn validate_status_change(
    wallet_id: WalletId,
    from: WalletStatus,
    to: WalletStatus,
) -> Result<(), WalletError> {
    match (from, to) {
        (WalletStatus::Closed, _) => Err(WalletError::AlreadyClosed(wallet_id)),
        (_, WalletStatus::Closed) => Err(WalletError::IllegalStatusChange { from, to }),
        _ => Ok(()),
    }
}

/// Validates that a wallet may be closed.
///
/// # Errors
///
/// Returns `AlreadyClosed` if closed, `CloseWithBalance` if funds remain.
pub fn validate_close(
    wallet_id: WalletId,
    status: WalletStatus,
    balance: WalletBalance,
) -> Result<(), WalletError> {
    if status == WalletStatus::Closed {
        return Err(WalletError::AlreadyClosed(wallet_id));
    }
    if balance.balance != 0 {
        return Err(WalletError::CloseWithBalance {
            balance: balance.balance,
        });
    }
    Ok(())
}

/// Checks that `caller` owns the wallet.
///
/// The surrounding service decides who may act; this only compares identities.
///
/// # Errors
///
/// Returns `NotOwner` on mismatch.
pub fn ensure_owner(wallet: &WalletSnapshot, caller: UserId) -> Result<(), WalletError> {
    if wallet.user_id == caller {
        Ok(())
    } else {
        Err(WalletError::NotOwner(wallet.id))
    }
}

/// Checks that the wallet is active.
///
/// # Errors
///
/// Returns `Inactive` otherwise.
pub fn ensure_active(wallet: &WalletSnapshot) -> Result<(), WalletError> {
    if wallet.status == WalletStatus::Active {
        Ok(())
    } else {
        Err(WalletError::Inactive {
            wallet_id: wallet.id,
            status: wallet.status,
        })
    }
}

fn ensure_positive(amount: i64) -> Result<(), WalletError> {
    if amount <= 0 {
        return Err(WalletError::InvalidAmount(amount));
    }
    Ok(())
}

impl WalletBalance {
    /// Checks that `amount` is available to move.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` with the shortfall.
    pub const fn ensure_available(&self, amount: i64) -> Result<(), WalletError> {
        if self.available_balance < amount {
            return Err(WalletError::InsufficientBalance {
                available: self.available_balance,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Removes settled funds.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount or insufficient funds.
    pub fn debit(self, amount: i64) -> Result<Self, WalletError> {
        ensure_positive(amount)?;
        self.ensure_available(amount)?;
        Ok(Self::new(
            self.balance - amount,
            self.available_balance - amount,
        ))
    }

    /// Adds settled funds.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount or overflow.
    pub fn credit(self, amount: i64) -> Result<Self, WalletError> {
        ensure_positive(amount)?;
        let balance = self.balance.checked_add(amount).ok_or(WalletError::Overflow)?;
        let available_balance = self
            .available_balance
            .checked_add(amount)
            .ok_or(WalletError::Overflow)?;
        Ok(Self::new(balance, available_balance))
    }

    /// Earmarks funds: they stay in `balance` but leave `available_balance`.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount or insufficient funds.
    pub fn hold(self, amount: i64) -> Result<Self, WalletError> {
        ensure_positive(amount)?;
        self.ensure_available(amount)?;
        Ok(Self::new(self.balance, self.available_balance - amount))
    }

    /// Returns held funds to `available_balance`.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount or if less is held.
    pub fn release(self, amount: i64) -> Result<Self, WalletError> {
        ensure_positive(amount)?;
        if self.held() < amount {
            return Err(WalletError::InsufficientHeld {
                held: self.held(),
                requested: amount,
            });
        }
        Ok(Self::new(self.balance, self.available_balance + amount))
    }
}
