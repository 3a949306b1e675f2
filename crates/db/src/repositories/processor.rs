//! Transfer, deposit, and withdrawal processing.
//!
//! Every operation runs in one short database transaction:
//!
//! 1. Look up the idempotency marker; a hit returns a replayed receipt.
//! 2. Lock the wallet rows, lowest wallet ID first.
//! 3. Validate, reserve limits (transfers only), and write balances.
//! 4. Insert the marker. A unique violation here means a concurrent caller
//!    won with the same key, and this unit of work rolls back.
//! 5. Commit, then publish the domain event.
//!
//! Each call is bounded by a deadline. Dropping the in-flight transaction on
//! expiry rolls it back, so a timed-out call can always be retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tijori_core::transfer::{
    OperationKind, Receipt, TransactionKey, TransferError, plan_deposit, plan_transfer,
    plan_withdrawal,
};
use tijori_core::wallet::{WalletSnapshot, ensure_owner};
use tijori_core::{Clock, DomainEvent, EventPublisher, SystemClock};
use tijori_shared::AppError;
use tijori_shared::config::ProcessingConfig;
use tijori_shared::types::{UserId, WalletId};
use tracing::{error, info, instrument, warn};

use super::limits;
use super::wallet::{WalletStoreError, lock_wallet, save_balance, snapshot};
use crate::entities::{
    processed_deposits, processed_transfers, processed_withdrawals,
    sea_orm_active_enums::DepositStatus,
};
use crate::error::is_unique_violation;
use crate::events::TracingEventPublisher;

/// Error types for money movement.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// The deadline passed before the operation committed.
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        /// Operation that timed out.
        operation: OperationKind,
        /// Deadline in milliseconds.
        timeout_ms: u64,
    },

    /// Another caller holds or has used this transaction ID.
    #[error("Transaction {0} is already being processed")]
    DuplicateTransaction(String),

    /// Validation or balance rule failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Wallet store failed.
    #[error(transparent)]
    Store(#[from] WalletStoreError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ProcessorError> for AppError {
    fn from(err: ProcessorError) -> Self {
        match err {
            ProcessorError::Timeout { .. } => Self::Timeout(err.to_string()),
            ProcessorError::DuplicateTransaction(_) => Self::Conflict(err.to_string()),
            ProcessorError::Transfer(err) => err.into(),
            ProcessorError::Store(err) => err.into(),
            ProcessorError::Database(err) => crate::error::database_error(&err),
        }
    }
}

/// Move funds between two wallets.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Debited wallet.
    pub source: WalletId,
    /// Credited wallet.
    pub destination: WalletId,
    /// Amount in minor units.
    pub amount: i64,
    /// Caller-supplied idempotency key.
    pub transaction_id: String,
    /// Overrides the configured deadline.
    pub timeout: Option<Duration>,
    /// User on whose behalf funds leave the source; must own it when set.
    pub initiated_by: Option<UserId>,
}

impl TransferRequest {
    /// Creates a transfer request with the configured deadline.
    #[must_use]
    pub fn new(
        source: WalletId,
        destination: WalletId,
        amount: i64,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            source,
            destination,
            amount,
            transaction_id: transaction_id.into(),
            timeout: None,
            initiated_by: None,
        }
    }

    /// Sets a deadline for this call only.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Requires the source wallet to belong to `user`.
    #[must_use]
    pub fn initiated_by(mut self, user: UserId) -> Self {
        self.initiated_by = Some(user);
        self
    }
}

/// Move funds into or out of one wallet.
#[derive(Debug, Clone)]
pub struct MovementRequest {
    /// The wallet.
    pub wallet_id: WalletId,
    /// Amount in minor units.
    pub amount: i64,
    /// Caller-supplied idempotency key.
    pub transaction_id: String,
    /// Overrides the configured deadline.
    pub timeout: Option<Duration>,
    /// For withdrawals, the user who must own the wallet.
    pub initiated_by: Option<UserId>,
}

impl MovementRequest {
    /// Creates a request with the configured deadline.
    #[must_use]
    pub fn new(wallet_id: WalletId, amount: i64, transaction_id: impl Into<String>) -> Self {
        Self {
            wallet_id,
            amount,
            transaction_id: transaction_id.into(),
            timeout: None,
            initiated_by: None,
        }
    }

    /// Sets a deadline for this call only.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Requires the wallet to belong to `user` when funds leave it.
    #[must_use]
    pub fn initiated_by(mut self, user: UserId) -> Self {
        self.initiated_by = Some(user);
        self
    }
}

/// Outcome of the confirmation step of an external deposit.
enum Confirmation {
    /// Marker is in place and the credit is still owed.
    Pending,
    /// The deposit was already credited.
    Completed(i64),
}

/// Runs money movement against the wallet store.
#[derive(Clone)]
pub struct TransferProcessor {
    db: DatabaseConnection,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for TransferProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferProcessor")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TransferProcessor {
    /// Creates a processor with the default deadline.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            timeout: ProcessingConfig::default().operation_timeout(),
            clock: Arc::new(SystemClock),
            publisher: Arc::new(TracingEventPublisher),
        }
    }

    /// Applies processing settings.
    #[must_use]
    pub fn with_config(mut self, config: &ProcessingConfig) -> Self {
        self.timeout = config.operation_timeout();
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

    /// Moves funds from one wallet to another exactly once per transaction ID.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not positive or the transaction ID is malformed
    /// - Source and destination are the same wallet
    /// - Either wallet is missing or not active
    /// - `initiated_by` is set and does not own the source wallet
    /// - Currencies differ or the source lacks available balance
    /// - The source's daily or monthly limit would be exceeded
    /// - A concurrent call with the same transaction ID committed first
    /// - The deadline passes
    #[instrument(
        skip(self, request),
        fields(
            transaction_id = %request.transaction_id,
            source = %request.source,
            destination = %request.destination,
            amount = request.amount
        )
    )]
    pub async fn process_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<Receipt, ProcessorError> {
        let key = TransactionKey::parse(&request.transaction_id)?;
        self.with_deadline(
            OperationKind::Transfer,
            request.timeout,
            self.transfer(&request, key),
        )
        .await
    }

    /// Credits a wallet exactly once per transaction ID.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount, a missing or inactive
    /// wallet, a duplicate in flight, or an expired deadline.
    #[instrument(
        skip(self, request),
        fields(transaction_id = %request.transaction_id, wallet_id = %request.wallet_id, amount = request.amount)
    )]
    pub async fn process_deposit(&self, request: MovementRequest) -> Result<Receipt, ProcessorError> {
        let key = TransactionKey::parse(&request.transaction_id)?;
        self.with_deadline(
            OperationKind::Deposit,
            request.timeout,
            self.deposit(&request, key),
        )
        .await
    }

    /// Debits a wallet exactly once per transaction ID.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount, a missing or inactive
    /// wallet, insufficient available balance, a duplicate in flight, or an
    /// expired deadline.
    #[instrument(
        skip(self, request),
        fields(transaction_id = %request.transaction_id, wallet_id = %request.wallet_id, amount = request.amount)
    )]
    pub async fn process_withdrawal(
        &self,
        request: MovementRequest,
    ) -> Result<Receipt, ProcessorError> {
        let key = TransactionKey::parse(&request.transaction_id)?;
        self.with_deadline(
            OperationKind::Withdrawal,
            request.timeout,
            self.withdrawal(&request, key),
        )
        .await
    }

    /// Completes a deposit that an external rail has already confirmed.
    ///
    /// The confirmation marker commits first. The balance credit follows in
    /// a second transaction; if that fails or the deadline passes, the
    /// marker is removed again so the deposit can be retried. A failure of
    /// that removal is logged with `alert = true` and needs an operator.
    ///
    /// Calling again with a key whose credit is still owed resumes it.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever step failed.
    #[instrument(
        skip(self, request),
        fields(transaction_id = %request.transaction_id, wallet_id = %request.wallet_id, amount = request.amount)
    )]
    pub async fn complete_external_deposit(
        &self,
        request: MovementRequest,
    ) -> Result<Receipt, ProcessorError> {
        let key = TransactionKey::parse(&request.transaction_id)?;
        ensure_positive(request.amount)?;

        let limit = request.timeout.unwrap_or(self.timeout);
        let deadline = tokio::time::Instant::now() + limit;
        let timed_out = || ProcessorError::Timeout {
            operation: OperationKind::Deposit,
            timeout_ms: millis(limit),
        };

        let confirmation = tokio::time::timeout_at(deadline, self.confirm_deposit(&request, &key))
            .await
            .map_err(|_| timed_out())??;
        if let Confirmation::Completed(amount) = confirmation {
            info!("external deposit replayed");
            return Ok(receipt(OperationKind::Deposit, key, amount, true));
        }

        let credited = tokio::time::timeout_at(deadline, self.credit_confirmed(&request, &key))
            .await
            .unwrap_or_else(|_| Err(timed_out()));

        match credited {
            Ok(replayed) => {
                if !replayed {
                    self.publish_deposit(&key, request.wallet_id, request.amount);
                }
                Ok(receipt(OperationKind::Deposit, key, request.amount, replayed))
            }
            Err(err) => {
                warn!(error = %err, "external deposit credit failed, rolling back confirmation");
                self.rollback_confirmation(&key).await;
                Err(err)
            }
        }
    }

    async fn with_deadline<T, F>(
        &self,
        operation: OperationKind,
        timeout: Option<Duration>,
        work: F,
    ) -> Result<T, ProcessorError>
    where
        F: Future<Output = Result<T, ProcessorError>>,
    {
        let limit = timeout.unwrap_or(self.timeout);
        if let Ok(result) = tokio::time::timeout(limit, work).await {
            result
        } else {
            warn!(%operation, timeout_ms = millis(limit), "operation deadline exceeded");
            Err(ProcessorError::Timeout {
                operation,
                timeout_ms: millis(limit),
            })
        }
    }

    async fn transfer(
        &self,
        request: &TransferRequest,
        key: TransactionKey,
    ) -> Result<Receipt, ProcessorError> {
        let txn = self.db.begin().await?;

        if let Some(done) = processed_transfers::Entity::find_by_id(key.as_str().to_owned())
            .one(&txn)
            .await?
        {
            info!("transfer replayed");
            return Ok(receipt(OperationKind::Transfer, key, done.amount, true));
        }

        ensure_positive(request.amount)?;
        if request.source == request.destination {
            return Err(TransferError::SameWallet.into());
        }

        let [first, second] = WalletId::lock_order(request.source, request.destination);
        let first_row = lock_wallet(&txn, first).await?;
        let second_row = lock_wallet(&txn, second).await?;
        let (source_row, destination_row) = if first == request.source {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };

        let source = snapshot(&source_row);
        check_owner(&source, request.initiated_by)?;
        let plan = plan_transfer(&source, &snapshot(&destination_row), request.amount)?;

        let now = self.clock.now();
        limits::reserve(&txn, request.source, request.amount, now).await?;
        save_balance(&txn, source_row, plan.source, now).await?;
        save_balance(&txn, destination_row, plan.destination, now).await?;

        processed_transfers::ActiveModel {
            transaction_id: Set(key.as_str().to_owned()),
            source_wallet_id: Set(request.source.into_inner()),
            destination_wallet_id: Set(request.destination.into_inner()),
            amount: Set(request.amount),
            processed_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|err| marker_error(err, &key))?;

        txn.commit().await?;

        info!("transfer completed");
        self.publisher.publish(&DomainEvent::TransferCompleted {
            transaction_id: key.as_str().to_owned(),
            source_wallet_id: request.source,
            destination_wallet_id: request.destination,
            amount: request.amount,
            currency: source.currency,
            occurred_at: now,
        });
        Ok(receipt(OperationKind::Transfer, key, request.amount, false))
    }

    async fn deposit(
        &self,
        request: &MovementRequest,
        key: TransactionKey,
    ) -> Result<Receipt, ProcessorError> {
        let txn = self.db.begin().await?;

        if let Some(done) = processed_deposits::Entity::find_by_id(key.as_str().to_owned())
            .one(&txn)
            .await?
        {
            if done.status != DepositStatus::Completed {
                return Err(ProcessorError::DuplicateTransaction(key.to_string()));
            }
            info!("deposit replayed");
            return Ok(receipt(OperationKind::Deposit, key, done.amount, true));
        }

        ensure_positive(request.amount)?;
        let wallet = lock_wallet(&txn, request.wallet_id).await?;
        let balance = plan_deposit(&snapshot(&wallet), request.amount)?;

        let now = self.clock.now();
        save_balance(&txn, wallet, balance, now).await?;

        processed_deposits::ActiveModel {
            transaction_id: Set(key.as_str().to_owned()),
            wallet_id: Set(request.wallet_id.into_inner()),
            amount: Set(request.amount),
            status: Set(DepositStatus::Completed),
            processed_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|err| marker_error(err, &key))?;

        txn.commit().await?;

        info!(balance = balance.balance, "deposit completed");
        self.publish_deposit(&key, request.wallet_id, request.amount);
        Ok(receipt(OperationKind::Deposit, key, request.amount, false))
    }

    async fn withdrawal(
        &self,
        request: &MovementRequest,
        key: TransactionKey,
    ) -> Result<Receipt, ProcessorError> {
        let txn = self.db.begin().await?;

        if let Some(done) = processed_withdrawals::Entity::find_by_id(key.as_str().to_owned())
            .one(&txn)
            .await?
        {
            info!("withdrawal replayed");
            return Ok(receipt(OperationKind::Withdrawal, key, done.amount, true));
        }

        ensure_positive(request.amount)?;
        let wallet = lock_wallet(&txn, request.wallet_id).await?;
        let current = snapshot(&wallet);
        check_owner(&current, request.initiated_by)?;
        let balance = plan_withdrawal(&current, request.amount)?;

        let now = self.clock.now();
        save_balance(&txn, wallet, balance, now).await?;

        processed_withdrawals::ActiveModel {
            transaction_id: Set(key.as_str().to_owned()),
            wallet_id: Set(request.wallet_id.into_inner()),
            amount: Set(request.amount),
            processed_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|err| marker_error(err, &key))?;

        txn.commit().await?;

        info!(balance = balance.balance, "withdrawal completed");
        self.publisher.publish(&DomainEvent::WithdrawalCompleted {
            transaction_id: key.as_str().to_owned(),
            wallet_id: request.wallet_id,
            amount: request.amount,
            occurred_at: now,
        });
        Ok(receipt(OperationKind::Withdrawal, key, request.amount, false))
    }

    /// Commits the `confirmed` marker of an external deposit.
    async fn confirm_deposit(
        &self,
        request: &MovementRequest,
        key: &TransactionKey,
    ) -> Result<Confirmation, ProcessorError> {
        let txn = self.db.begin().await?;

        if let Some(marker) = processed_deposits::Entity::find_by_id(key.as_str().to_owned())
            .one(&txn)
            .await?
        {
            if marker.wallet_id != request.wallet_id.into_inner() || marker.amount != request.amount
            {
                return Err(ProcessorError::DuplicateTransaction(key.to_string()));
            }
            return Ok(match marker.status {
                DepositStatus::Completed => Confirmation::Completed(marker.amount),
                DepositStatus::Confirmed => Confirmation::Pending,
            });
        }

        processed_deposits::ActiveModel {
            transaction_id: Set(key.as_str().to_owned()),
            wallet_id: Set(request.wallet_id.into_inner()),
            amount: Set(request.amount),
            status: Set(DepositStatus::Confirmed),
            processed_at: Set(self.clock.now().into()),
        }
        .insert(&txn)
        .await
        .map_err(|err| marker_error(err, key))?;

        txn.commit().await?;
        info!("external deposit confirmed");
        Ok(Confirmation::Pending)
    }

    /// Credits the wallet and flips the marker to `completed`.
    ///
    /// Returns true if another caller finished the credit first.
    async fn credit_confirmed(
        &self,
        request: &MovementRequest,
        key: &TransactionKey,
    ) -> Result<bool, ProcessorError> {
        let txn = self.db.begin().await?;

        let marker = lock_marker(&txn, key).await?;
        if marker.status == DepositStatus::Completed {
            return Ok(true);
        }

        let wallet = lock_wallet(&txn, request.wallet_id).await?;
        let balance = plan_deposit(&snapshot(&wallet), request.amount)?;
        let now = self.clock.now();
        save_balance(&txn, wallet, balance, now).await?;

        let mut active: processed_deposits::ActiveModel = marker.into();
        active.status = Set(DepositStatus::Completed);
        active.processed_at = Set(now.into());
        active.update(&txn).await?;

        txn.commit().await?;
        info!(balance = balance.balance, "external deposit completed");
        Ok(false)
    }

    /// Best-effort removal of a `confirmed` marker whose credit failed.
    async fn rollback_confirmation(&self, key: &TransactionKey) {
        let result = processed_deposits::Entity::delete_many()
            .filter(processed_deposits::Column::TransactionId.eq(key.as_str()))
            .filter(processed_deposits::Column::Status.eq(DepositStatus::Confirmed))
            .exec(&self.db)
            .await;

        match result {
            Ok(deleted) => {
                warn!(
                    transaction_id = %key,
                    rows = deleted.rows_affected,
                    "deposit confirmation rolled back"
                );
            }
            Err(err) => {
                error!(
                    alert = true,
                    transaction_id = %key,
                    error = %err,
                    "deposit confirmation rollback failed, manual reconciliation required"
                );
            }
        }
    }

    fn publish_deposit(&self, key: &TransactionKey, wallet_id: WalletId, amount: i64) {
        self.publisher.publish(&DomainEvent::DepositCompleted {
            transaction_id: key.as_str().to_owned(),
            wallet_id,
            amount,
            occurred_at: self.clock.now(),
        });
    }
}

async fn lock_marker(
    txn: &DatabaseTransaction,
    key: &TransactionKey,
) -> Result<processed_deposits::Model, ProcessorError> {
    processed_deposits::Entity::find_by_id(key.as_str().to_owned())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ProcessorError::DuplicateTransaction(key.to_string()))
}

fn check_owner(wallet: &WalletSnapshot, caller: Option<UserId>) -> Result<(), WalletStoreError> {
    if let Some(caller) = caller {
        ensure_owner(wallet, caller)?;
    }
    Ok(())
}

fn ensure_positive(amount: i64) -> Result<(), TransferError> {
    if amount <= 0 {
        return Err(TransferError::InvalidAmount(amount));
    }
    Ok(())
}

fn marker_error(err: DbErr, key: &TransactionKey) -> ProcessorError {
    if is_unique_violation(&err) {
        warn!(transaction_id = %key, "lost idempotency race");
        ProcessorError::DuplicateTransaction(key.to_string())
    } else {
        ProcessorError::Database(err)
    }
}

fn receipt(
    kind: OperationKind,
    transaction_id: TransactionKey,
    amount: i64,
    replayed: bool,
) -> Receipt {
    Receipt {
        kind,
        transaction_id,
        amount,
        replayed,
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
