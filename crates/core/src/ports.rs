//! Collaborator interfaces the core depends on.

use tijori_shared::types::WalletId;
use tijori_shared::{AppError, AppResult};

use crate::ledger::{AccountType, LedgerAccount, NewAccount};

/// Chart-of-accounts access used by wallet provisioning and bootstrap.
///
/// The `db` crate's account repository implements this in-process.
#[async_trait::async_trait]
pub trait LedgerPort: Send + Sync {
    /// Creates an account. Returns `Conflict` if the code exists.
    async fn create_account(&self, input: NewAccount) -> AppResult<LedgerAccount>;

    /// Looks up an account by code. Absence is `Ok(None)`.
    async fn get_account_by_code(&self, code: &str) -> AppResult<Option<LedgerAccount>>;
}

/// Returns the account with `input.code`, creating it if missing.
///
/// A concurrent creator winning the race shows up as `Conflict`; the account
/// is then read back.
///
/// # Errors
///
/// Returns any error other than that race.
pub async fn ensure_account<P>(port: &P, input: NewAccount) -> AppResult<LedgerAccount>
where
    P: LedgerPort + ?Sized,
{
    if let Some(existing) = port.get_account_by_code(&input.code).await? {
        return Ok(existing);
    }
    let code = input.code.clone();
    match port.create_account(input).await {
        Ok(account) => Ok(account),
        Err(AppError::Conflict(_)) => port
            .get_account_by_code(&code)
            .await?
            .ok_or_else(|| AppError::Internal(format!("account {code} vanished after conflict"))),
        Err(err) => Err(err),
    }
}

/// The liability account backing a wallet in the chart of accounts.
#[must_use]
pub fn wallet_ledger_account(wallet_id: WalletId, currency: &str) -> NewAccount {
    let simple = wallet_id.into_inner().simple().to_string();
    NewAccount {
        code: format!("WAL-{simple}"),
        name: format!("Wallet {wallet_id}"),
        account_type: AccountType::Liability,
        currency: currency.to_string(),
        parent_id: None,
    }
}
