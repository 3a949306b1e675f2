//! Limit Manager: per-wallet daily and monthly spend counters.
//!
//! Reservations run inside the caller's transaction under a lock on the
//! limits row. A rejected reservation writes nothing, and the caller rolls
//! back its own work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QuerySelect, Set,
    TransactionTrait, prelude::DateTimeWithTimeZone,
};
use tijori_core::limits::{LimitState, SpendLimits};
use tijori_core::{Clock, SystemClock};
use tijori_shared::types::WalletId;
use tracing::{debug, info, instrument};

use super::wallet::WalletStoreError;
use crate::entities::wallet_limits;

/// Reads and adjusts wallet limits outside of money movement.
#[derive(Clone)]
pub struct LimitRepository {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LimitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitRepository").finish_non_exhaustive()
    }
}

impl LimitRepository {
    /// Creates a limit repository on the system clock.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the limits as they apply now.
    ///
    /// Counters whose window has elapsed read as zero; nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `LimitsNotFound` if the wallet has no limits row.
    pub async fn get_limits(&self, wallet_id: WalletId) -> Result<LimitState, WalletStoreError> {
        let row = wallet_limits::Entity::find_by_id(wallet_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(WalletStoreError::LimitsNotFound(wallet_id))?;
        Ok(to_state(&row).refreshed(self.clock.now()))
    }

    /// Changes the ceilings of a wallet. Counters are kept.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLimits` unless both are positive and monthly covers daily.
    #[instrument(skip(self))]
    pub async fn update_limits(
        &self,
        wallet_id: WalletId,
        daily_limit: i64,
        monthly_limit: i64,
    ) -> Result<LimitState, WalletStoreError> {
        let limits = SpendLimits::new(daily_limit, monthly_limit)?;

        let txn = self.db.begin().await?;
        let now = self.clock.now();
        let row = lock_limits(&txn, wallet_id).await?;
        let state = to_state(&row).refreshed(now).with_limits(limits);
        save_state(&txn, row, &state, now).await?;
        txn.commit().await?;

        info!(%wallet_id, daily_limit, monthly_limit, "wallet limits updated");
        Ok(state)
    }

    /// Reserves `amount` against the wallet's limits inside `txn`.
    ///
    /// # Errors
    ///
    /// Returns `Limit` when either window would be exceeded.
    pub async fn check_and_reserve(
        &self,
        txn: &DatabaseTransaction,
        wallet_id: WalletId,
        amount: i64,
    ) -> Result<LimitState, WalletStoreError> {
        reserve(txn, wallet_id, amount, self.clock.now()).await
    }
}

/// Locks the limits row, applies the lazy reset, and reserves `amount`.
pub(crate) async fn reserve(
    txn: &DatabaseTransaction,
    wallet_id: WalletId,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<LimitState, WalletStoreError> {
    let row = lock_limits(txn, wallet_id).await?;
    let state = to_state(&row).reserve(amount, now)?;
    save_state(txn, row, &state, now).await?;

    debug!(
        %wallet_id,
        amount,
        daily_spent = state.daily_spent,
        monthly_spent = state.monthly_spent,
        "limits reserved"
    );
    Ok(state)
}

/// Inserts the limits row of a new wallet.
pub(crate) async fn insert_limits(
    txn: &DatabaseTransaction,
    wallet_id: WalletId,
    limits: SpendLimits,
    now: DateTime<Utc>,
) -> Result<wallet_limits::Model, WalletStoreError> {
    let state = LimitState::new(limits, now);
    let model = wallet_limits::ActiveModel {
        wallet_id: Set(wallet_id.into_inner()),
        daily_limit: Set(state.daily_limit),
        daily_spent: Set(state.daily_spent),
        daily_reset_at: Set(state.daily_reset_at.into()),
        monthly_limit: Set(state.monthly_limit),
        monthly_spent: Set(state.monthly_spent),
        monthly_reset_at: Set(state.monthly_reset_at.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await?;
    Ok(model)
}

async fn lock_limits(
    txn: &DatabaseTransaction,
    wallet_id: WalletId,
) -> Result<wallet_limits::Model, WalletStoreError> {
    wallet_limits::Entity::find_by_id(wallet_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(WalletStoreError::LimitsNotFound(wallet_id))
}

async fn save_state(
    txn: &DatabaseTransaction,
    row: wallet_limits::Model,
    state: &LimitState,
    now: DateTime<Utc>,
) -> Result<(), WalletStoreError> {
    let mut active: wallet_limits::ActiveModel = row.into();
    active.daily_limit = Set(state.daily_limit);
    active.daily_spent = Set(state.daily_spent);
    active.daily_reset_at = Set(state.daily_reset_at.into());
    active.monthly_limit = Set(state.monthly_limit);
    active.monthly_spent = Set(state.monthly_spent);
    active.monthly_reset_at = Set(state.monthly_reset_at.into());
    active.updated_at = Set(now.into());
    active.update(txn).await?;
    Ok(())
}

fn to_state(row: &wallet_limits::Model) -> LimitState {
    LimitState {
        daily_limit: row.daily_limit,
        daily_spent: row.daily_spent,
        daily_reset_at: utc(row.daily_reset_at),
        monthly_limit: row.monthly_limit,
        monthly_spent: row.monthly_spent,
        monthly_reset_at: utc(row.monthly_reset_at),
    }
}

fn utc(stamp: DateTimeWithTimeZone) -> DateTime<Utc> {
    stamp.with_timezone(&Utc)
}
