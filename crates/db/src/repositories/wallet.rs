//! Wallet store: wallet rows, their limits, and balance/hold primitives.
//!
//! The balance primitives (`lock_wallet`, `save_balance`) take an open
//! transaction and a wallet that is already locked. They are not idempotent
//! and are only reachable through the processor and the hold operations
//! below.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
};
use tijori_core::ledger::LedgerAccount;
use tijori_core::limits::{LimitError, SpendLimits};
use tijori_core::wallet::{
    WalletBalance, WalletError, WalletSnapshot, WalletStatus as CoreWalletStatus,
    WalletType as CoreWalletType, validate_close, validate_status_change,
};
use tijori_core::{
    Clock, DomainEvent, EventPublisher, LedgerPort, SystemClock, ensure_account,
    wallet_ledger_account,
};
use tijori_shared::AppError;
use tijori_shared::config::LimitsConfig;
use tijori_shared::types::{Currency, UserId, WalletId};
use tracing::{info, instrument, warn};

use super::limits::insert_limits;
use crate::entities::{
    sea_orm_active_enums::{WalletStatus, WalletType},
    wallets,
};
use crate::error::is_unique_violation;
use crate::events::TracingEventPublisher;

/// Error types for wallet store operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletStoreError {
    /// Wallet not found.
    #[error("Wallet not found: {0}")]
    NotFound(WalletId),

    /// The owner already has a wallet of this type and currency.
    #[error("User {user_id} already has a {wallet_type} wallet in {currency}")]
    Duplicate {
        /// Owner.
        user_id: UserId,
        /// Wallet type.
        wallet_type: &'static str,
        /// ISO currency code.
        currency: String,
    },

    /// Currency is not supported.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Wallet has no limits row.
    #[error("Limits not found for wallet {0}")]
    LimitsNotFound(WalletId),

    /// Wallet rule violated.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Limit rule violated.
    #[error(transparent)]
    Limit(#[from] LimitError),

    /// Ledger collaborator failed.
    #[error("Ledger error: {0}")]
    Ledger(AppError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<WalletStoreError> for AppError {
    fn from(err: WalletStoreError) -> Self {
        match err {
            WalletStoreError::NotFound(_) | WalletStoreError::LimitsNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            WalletStoreError::Duplicate { .. } => Self::Conflict(err.to_string()),
            WalletStoreError::UnsupportedCurrency(_) => Self::Validation(err.to_string()),
            WalletStoreError::Wallet(err) => err.into(),
            WalletStoreError::Limit(err) => err.into(),
            WalletStoreError::Ledger(err) => err,
            WalletStoreError::Database(err) => crate::error::database_error(&err),
        }
    }
}

/// Wallet repository.
#[derive(Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
    limits: SpendLimits,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for WalletRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRepository")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl WalletRepository {
    /// Creates a wallet repository with default limits, the system clock, and
    /// the logging publisher.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            limits: LimitsConfig::default().into(),
            clock: Arc::new(SystemClock),
            publisher: Arc::new(TracingEventPublisher),
        }
    }

    /// Sets the limits given to new wallets.
    #[must_use]
    pub fn with_limits(mut self, limits: SpendLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the event publisher.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Creates a wallet and its limits row in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The currency is not supported
    /// - The user already has a wallet of this type and currency
    /// - Database operation fails
    #[instrument(skip(self))]
    pub async fn create_wallet(
        &self,
        user_id: UserId,
        wallet_type: CoreWalletType,
        currency: &str,
    ) -> Result<wallets::Model, WalletStoreError> {
        let currency = Currency::from_str(currency)
            .map_err(|_| WalletStoreError::UnsupportedCurrency(currency.to_string()))?
            .code()
            .to_string();
        let duplicate = || WalletStoreError::Duplicate {
            user_id,
            wallet_type: wallet_type.as_str(),
            currency: currency.clone(),
        };

        let existing = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id.into_inner()))
            .filter(wallets::Column::WalletType.eq(WalletType::from(wallet_type)))
            .filter(wallets::Column::Currency.eq(currency.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(duplicate());
        }

        let now = self.clock.now();
        let stamp: DateTimeWithTimeZone = now.into();
        let wallet_id = WalletId::new();

        let txn = self.db.begin().await?;
        let wallet = wallets::ActiveModel {
            id: Set(wallet_id.into_inner()),
            user_id: Set(user_id.into_inner()),
            wallet_type: Set(wallet_type.into()),
            currency: Set(currency.clone()),
            balance: Set(0),
            available_balance: Set(0),
            status: Set(WalletStatus::Active),
            ledger_account_id: Set(None),
            metadata: Set(None),
            closed_at: Set(None),
            close_reason: Set(None),
            created_at: Set(stamp),
            updated_at: Set(stamp),
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                duplicate()
            } else {
                WalletStoreError::Database(err)
            }
        })?;
        insert_limits(&txn, wallet_id, self.limits, now).await?;
        txn.commit().await?;

        info!(%wallet_id, %user_id, currency = %wallet.currency, "wallet created");
        self.publisher.publish(&DomainEvent::WalletCreated {
            wallet_id,
            user_id,
            currency: wallet.currency.clone(),
        });
        Ok(wallet)
    }

    /// Finds a wallet by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_wallet(&self, id: WalletId) -> Result<Option<wallets::Model>, DbErr> {
        wallets::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Gets a wallet by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the wallet does not exist.
    pub async fn get_wallet(&self, id: WalletId) -> Result<wallets::Model, WalletStoreError> {
        self.find_wallet(id)
            .await?
            .ok_or(WalletStoreError::NotFound(id))
    }

    /// Lists a user's wallets, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_wallets(
        &self,
        user_id: UserId,
        status: Option<CoreWalletStatus>,
    ) -> Result<Vec<wallets::Model>, DbErr> {
        let mut query = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id.into_inner()))
            .order_by_asc(wallets::Column::CreatedAt)
            .order_by_asc(wallets::Column::Id);
        if let Some(status) = status {
            query = query.filter(wallets::Column::Status.eq(WalletStatus::from(status)));
        }
        query.all(&self.db).await
    }

    /// Gets the balance view of a wallet.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the wallet does not exist.
    pub async fn get_balance(&self, id: WalletId) -> Result<WalletBalance, WalletStoreError> {
        let wallet = self.get_wallet(id).await?;
        Ok(WalletBalance::new(wallet.balance, wallet.available_balance))
    }

    /// Swaps a wallet between active and frozen.
    ///
    /// Setting the current status again changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` for any change from or to closed.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: WalletId,
        status: CoreWalletStatus,
    ) -> Result<wallets::Model, WalletStoreError> {
        let txn = self.db.begin().await?;
        let wallet = lock_wallet(&txn, id).await?;
        let from: CoreWalletStatus = wallet.status.into();

        validate_status_change(id, from, status)?;
        if from == status {
            return Ok(wallet);
        }

        let mut active: wallets::ActiveModel = wallet.into();
        active.status = Set(status.into());
        active.updated_at = Set(self.clock.now().into());
        let wallet = active.update(&txn).await?;
        txn.commit().await?;

        info!(wallet_id = %id, %from, to = %status, "wallet status changed");
        self.publisher.publish(&DomainEvent::WalletStatusChanged {
            wallet_id: id,
            from,
            to: status,
        });
        Ok(wallet)
    }

    /// Closes a wallet for good.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if already closed, `BadRequest` if funds remain.
    #[instrument(skip(self, reason))]
    pub async fn close_wallet(
        &self,
        id: WalletId,
        reason: &str,
    ) -> Result<wallets::Model, WalletStoreError> {
        let txn = self.db.begin().await?;
        let wallet = lock_wallet(&txn, id).await?;
        let from: CoreWalletStatus = wallet.status.into();

        validate_close(
            id,
            from,
            WalletBalance::new(wallet.balance, wallet.available_balance),
        )?;

        let now: DateTimeWithTimeZone = self.clock.now().into();
        let reason = reason.trim();
        let mut active: wallets::ActiveModel = wallet.into();
        active.status = Set(WalletStatus::Closed);
        active.closed_at = Set(Some(now));
        active.close_reason = Set((!reason.is_empty()).then(|| reason.to_string()));
        active.updated_at = Set(now);
        let wallet = active.update(&txn).await?;
        txn.commit().await?;

        info!(wallet_id = %id, "wallet closed");
        self.publisher.publish(&DomainEvent::WalletStatusChanged {
            wallet_id: id,
            from,
            to: CoreWalletStatus::Closed,
        });
        Ok(wallet)
    }

    /// Earmarks funds on an active wallet.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if the wallet is not active or too little is available.
    #[instrument(skip(self))]
    pub async fn place_hold(
        &self,
        id: WalletId,
        amount: i64,
    ) -> Result<WalletBalance, WalletStoreError> {
        let txn = self.db.begin().await?;
        let wallet = lock_wallet(&txn, id).await?;
        let snapshot = snapshot(&wallet);
        tijori_core::wallet::ensure_active(&snapshot)?;

        let balance = snapshot.balance.hold(amount)?;
        save_balance(&txn, wallet, balance, self.clock.now()).await?;
        txn.commit().await?;

        info!(wallet_id = %id, amount, held = balance.held(), "hold placed");
        Ok(balance)
    }

    /// Returns held funds to the available balance.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if less than `amount` is held.
    #[instrument(skip(self))]
    pub async fn release_hold(
        &self,
        id: WalletId,
        amount: i64,
    ) -> Result<WalletBalance, WalletStoreError> {
        let txn = self.db.begin().await?;
        let wallet = lock_wallet(&txn, id).await?;
        let balance = snapshot(&wallet).balance.release(amount)?;
        save_balance(&txn, wallet, balance, self.clock.now()).await?;
        txn.commit().await?;

        info!(wallet_id = %id, amount, held = balance.held(), "hold released");
        Ok(balance)
    }

    /// Links a wallet to its liability account in the chart of accounts,
    /// creating the account if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown wallet, or the ledger's error.
    #[instrument(skip(self, ledger))]
    pub async fn provision_wallet(
        &self,
        ledger: &dyn LedgerPort,
        id: WalletId,
    ) -> Result<LedgerAccount, WalletStoreError> {
        let wallet = self.get_wallet(id).await?;
        let account = ensure_account(ledger, wallet_ledger_account(id, &wallet.currency))
            .await
            .map_err(WalletStoreError::Ledger)?;

        let account_uuid = account.id.into_inner();
        match wallet.ledger_account_id {
            Some(linked) if linked == account_uuid => {}
            Some(linked) => {
                warn!(wallet_id = %id, %linked, "replacing wallet ledger link");
                self.link_account(wallet, account_uuid).await?;
            }
            None => self.link_account(wallet, account_uuid).await?,
        }

        info!(wallet_id = %id, account_code = %account.code, "wallet provisioned");
        Ok(account)
    }

    async fn link_account(
        &self,
        wallet: wallets::Model,
        account_id: uuid::Uuid,
    ) -> Result<(), DbErr> {
        let mut active: wallets::ActiveModel = wallet.into();
        active.ledger_account_id = Set(Some(account_id));
        active.updated_at = Set(self.clock.now().into());
        active.update(&self.db).await?;
        Ok(())
    }
}

/// Locks a wallet row for the rest of `txn`.
pub(crate) async fn lock_wallet(
    txn: &DatabaseTransaction,
    id: WalletId,
) -> Result<wallets::Model, WalletStoreError> {
    wallets::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(WalletStoreError::NotFound(id))
}

/// The fields of a wallet row that money movement depends on.
pub(crate) fn snapshot(wallet: &wallets::Model) -> WalletSnapshot {
    WalletSnapshot {
        id: WalletId::from_uuid(wallet.id),
        user_id: UserId::from_uuid(wallet.user_id),
        currency: wallet.currency.clone(),
        status: wallet.status.into(),
        balance: WalletBalance::new(wallet.balance, wallet.available_balance),
    }
}

/// Writes new balances to a locked wallet.
pub(crate) async fn save_balance(
    txn: &DatabaseTransaction,
    wallet: wallets::Model,
    balance: WalletBalance,
    now: DateTime<Utc>,
) -> Result<wallets::Model, DbErr> {
    let mut active: wallets::ActiveModel = wallet.into();
    active.balance = Set(balance.balance);
    active.available_balance = Set(balance.available_balance);
    active.updated_at = Set(now.into());
    active.update(txn).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn model(status: WalletStatus) -> wallets::Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        wallets::Model {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            wallet_type: WalletType::Main,
            currency: "INR".into(),
            balance: 10_000,
            available_balance: 8_000,
            status,
            ledger_account_id: None,
            metadata: None,
            closed_at: None,
            close_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_snapshot_copies_money_fields() {
        let row = model(WalletStatus::Frozen);
        let snap = snapshot(&row);
        assert_eq!(snap.id.into_inner(), row.id);
        assert_eq!(snap.status, CoreWalletStatus::Frozen);
        assert_eq!(snap.balance.held(), 2_000);
    }

    #[test]
    fn test_error_mapping() {
        let dup = WalletStoreError::Duplicate {
            user_id: UserId::new(),
            wallet_type: "main",
            currency: "INR".into(),
        };
        assert!(matches!(AppError::from(dup), AppError::Conflict(_)));
        assert!(matches!(
            AppError::from(WalletStoreError::NotFound(WalletId::new())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(WalletStoreError::Wallet(WalletError::CloseWithBalance { balance: 5 })),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(WalletStoreError::UnsupportedCurrency("XYZ".into())),
            AppError::Validation(_)
        ));
    }
}
