//! Domain events emitted after a unit of work commits.
//!
//! Publishing happens after commit, so a subscriber never sees an event for
//! work that rolled back. Delivery is best effort; the database stays the
//! source of truth.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tijori_shared::types::{JournalEntryId, UserId, WalletId};

use crate::wallet::WalletStatus;

/// Something that happened in the ledger or wallet store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Funds moved between two wallets.
    TransferCompleted {
        /// Idempotency key.
        transaction_id: String,
        /// Debited wallet.
        source_wallet_id: WalletId,
        /// Credited wallet.
        destination_wallet_id: WalletId,
        /// Amount in minor units.
        amount: i64,
        /// ISO currency code.
        currency: String,
        /// Commit time.
        occurred_at: DateTime<Utc>,
    },
    /// Funds entered a wallet.
    DepositCompleted {
        /// Idempotency key.
        transaction_id: String,
        /// Credited wallet.
        wallet_id: WalletId,
        /// Amount in minor units.
        amount: i64,
        /// Commit time.
        occurred_at: DateTime<Utc>,
    },
    /// Funds left a wallet.
    WithdrawalCompleted {
        /// Idempotency key.
        transaction_id: String,
        /// Debited wallet.
        wallet_id: WalletId,
        /// Amount in minor units.
        amount: i64,
        /// Commit time.
        occurred_at: DateTime<Utc>,
    },
    /// A wallet was created.
    WalletCreated {
        /// The wallet.
        wallet_id: WalletId,
        /// Its owner.
        user_id: UserId,
        /// ISO currency code.
        currency: String,
    },
    /// A wallet changed status.
    WalletStatusChanged {
        /// The wallet.
        wallet_id: WalletId,
        /// Previous status.
        from: WalletStatus,
        /// New status.
        to: WalletStatus,
    },
    /// A journal entry was posted.
    EntryPosted {
        /// The entry.
        entry_id: JournalEntryId,
        /// Its number.
        entry_number: String,
    },
    /// A posted entry was reversed.
    EntryReversed {
        /// The original entry.
        entry_id: JournalEntryId,
        /// The reversing entry.
        reversal_entry_id: JournalEntryId,
    },
}

impl DomainEvent {
    /// Short event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TransferCompleted { .. } => "transfer_completed",
            Self::DepositCompleted { .. } => "deposit_completed",
            Self::WithdrawalCompleted { .. } => "withdrawal_completed",
            Self::WalletCreated { .. } => "wallet_created",
            Self::WalletStatusChanged { .. } => "wallet_status_changed",
            Self::EntryPosted { .. } => "entry_posted",
            Self::EntryReversed { .. } => "entry_reversed",
        }
    }
}

/// Outbound port for domain events.
pub trait EventPublisher: Send + Sync {
    /// Publishes one event. Must not fail the caller.
    fn publish(&self, event: &DomainEvent);
}

/// Publisher that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingPublisher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything published so far.
    #[must_use]
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of events published.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: &DomainEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event.clone());
    }
}
