//! Journal repository: the journal entry state machine on top of the
//! `journal_entries` and `ledger_lines` tables.
//!
//! Posting locks every referenced account row in ascending id order before
//! touching balances, so concurrent postings to overlapping accounts cannot
//! deadlock and never lose an update.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};
use tijori_core::ledger::{
    AccountBalance, EntryLifecycle, EntryStatus as CoreEntryStatus, EntryTransition,
    JournalEntryType, LedgerError, LineInput, NewJournalEntry, format_entry_number,
    reversal_description, reversing_lines, validate_lines,
};
use tijori_core::{Clock, DomainEvent, EventPublisher, SystemClock};
use tijori_shared::AppError;
use tijori_shared::types::{AccountId, JournalEntryId, LedgerLineId, PageRequest, PageResponse, UserId};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{
    accounts, journal_entries, ledger_lines, ledger_sequences,
    sea_orm_active_enums::{AccountStatus, EntryStatus, EntryType},
};
use crate::events::TracingEventPublisher;
use crate::migration::JOURNAL_ENTRY_SEQUENCE;

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Entry not found.
    #[error("Journal entry not found: {0}")]
    NotFound(JournalEntryId),

    /// A line references a missing account.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Ledger rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::NotFound(_) | JournalError::AccountNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            JournalError::Ledger(err) => err.into(),
            JournalError::Database(err) => crate::error::database_error(&err),
        }
    }
}

/// Journal entry with its lines in line order.
#[derive(Debug, Clone)]
pub struct EntryWithLines {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Lines ordered by `line_number`.
    pub lines: Vec<ledger_lines::Model>,
}

/// Result of reversing an entry.
#[derive(Debug, Clone)]
pub struct ReversalOutcome {
    /// The original entry, now `reversed`.
    pub original: journal_entries::Model,
    /// The posted reversing entry.
    pub reversal: EntryWithLines,
}

/// Journal repository.
#[derive(Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for JournalRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalRepository").finish_non_exhaustive()
    }
}

impl JournalRepository {
    /// Creates a journal repository using the system clock and logging publisher.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            publisher: Arc::new(TracingEventPublisher),
        }
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

    /// Creates a draft entry with the next sequential entry number.
    ///
    /// No balances change until the entry is posted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Fewer than two lines, a malformed line, or debits differ from credits
    /// - A line references a missing account
    /// - Database operation fails
    #[instrument(skip(self, input), fields(lines = input.lines.len()))]
    pub async fn create_entry(&self, input: NewJournalEntry) -> Result<EntryWithLines, JournalError> {
        validate_lines(&input.lines)?;

        let txn = self.db.begin().await?;

        let account_ids: BTreeSet<AccountId> =
            input.lines.iter().map(|line| line.account_id).collect();
        for account_id in account_ids {
            accounts::Entity::find_by_id(account_id.into_inner())
                .one(&txn)
                .await?
                .ok_or(JournalError::AccountNotFound(account_id))?;
        }

        let now = self.clock.now();
        let entry_number = next_entry_number(&txn).await?;
        let header = new_header(
            entry_number,
            input.entry_type,
            input.description,
            input.reference,
            input.created_by,
            now,
        );
        let entry = header.insert(&txn).await?;
        let lines = insert_lines(&txn, entry.id, &input.lines).await?;

        txn.commit().await?;

        info!(entry_id = %entry.id, entry_number = %entry.entry_number, "journal entry created");
        Ok(EntryWithLines { entry, lines })
    }

    /// Posts a draft entry and applies its lines to account balances.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The entry does not exist
    /// - The entry is not a draft
    /// - A referenced account is inactive
    /// - Database operation fails
    #[instrument(skip(self))]
    pub async fn post_entry(
        &self,
        id: JournalEntryId,
        posted_by: UserId,
    ) -> Result<journal_entries::Model, JournalError> {
        let txn = self.db.begin().await?;
        let entry = lock_entry(&txn, id).await?;

        let now = self.clock.now();
        let transition = EntryLifecycle::post(entry.status.into(), posted_by, now)?;

        let lines = to_line_inputs(&load_lines(&txn, entry.id).await?);
        validate_lines(&lines)?;
        apply_lines(&txn, &lines, now).await?;

        let mut active: journal_entries::ActiveModel = entry.into();
        apply_transition(&mut active, &transition);
        let entry = active.update(&txn).await?;

        txn.commit().await?;

        info!(entry_number = %entry.entry_number, "journal entry posted");
        self.publisher.publish(&DomainEvent::EntryPosted {
            entry_id: id,
            entry_number: entry.entry_number.clone(),
        });
        Ok(entry)
    }

    /// Marks a posted entry void. Balances are not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist, is not posted, or the
    /// reason is blank.
    #[instrument(skip(self, reason))]
    pub async fn void_entry(
        &self,
        id: JournalEntryId,
        voided_by: UserId,
        reason: &str,
    ) -> Result<journal_entries::Model, JournalError> {
        let txn = self.db.begin().await?;
        let entry = lock_entry(&txn, id).await?;

        let transition = EntryLifecycle::void(
            entry.status.into(),
            voided_by,
            reason.trim().to_string(),
            self.clock.now(),
        )?;

        let mut active: journal_entries::ActiveModel = entry.into();
        apply_transition(&mut active, &transition);
        let entry = active.update(&txn).await?;

        txn.commit().await?;

        info!(entry_number = %entry.entry_number, "journal entry voided");
        Ok(entry)
    }

    /// Reverses a posted entry.
    ///
    /// In one unit of work: books and posts a `reversing` entry with every
    /// line's sides swapped, marks the original `reversed`, and links both.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The entry does not exist or is not posted
    /// - The reason is shorter than ten characters
    /// - A referenced account is inactive
    /// - Database operation fails
    #[instrument(skip(self, reason))]
    pub async fn reverse_entry(
        &self,
        id: JournalEntryId,
        reversed_by: UserId,
        reason: &str,
    ) -> Result<ReversalOutcome, JournalError> {
        let reason = reason.trim().to_string();
        let txn = self.db.begin().await?;
        let original = lock_entry(&txn, id).await?;

        let now = self.clock.now();
        let transition =
            EntryLifecycle::reverse(original.status.into(), reversed_by, reason.clone(), now)?;

        let swapped = reversing_lines(&to_line_inputs(&load_lines(&txn, original.id).await?));
        validate_lines(&swapped)?;

        let entry_number = next_entry_number(&txn).await?;
        let mut header = new_header(
            entry_number,
            JournalEntryType::Reversing,
            reversal_description(&original.entry_number, &reason),
            original.reference.clone(),
            reversed_by,
            now,
        );
        header.status = Set(EntryStatus::Posted);
        header.posted_at = Set(Some(now.into()));
        header.posted_by = Set(Some(reversed_by.into_inner()));
        header.reverses_entry_id = Set(Some(original.id));
        let reversal = header.insert(&txn).await?;
        let reversal_lines = insert_lines(&txn, reversal.id, &swapped).await?;

        apply_lines(&txn, &swapped, now).await?;

        let mut active: journal_entries::ActiveModel = original.into();
        apply_transition(&mut active, &transition);
        active.reversed_by_entry_id = Set(Some(reversal.id));
        let original = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            entry_number = %original.entry_number,
            reversal_number = %reversal.entry_number,
            "journal entry reversed"
        );
        self.publisher.publish(&DomainEvent::EntryReversed {
            entry_id: id,
            reversal_entry_id: JournalEntryId::from_uuid(reversal.id),
        });

        Ok(ReversalOutcome {
            original,
            reversal: EntryWithLines {
                entry: reversal,
                lines: reversal_lines,
            },
        })
    }

    /// Gets an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    pub async fn get_entry(&self, id: JournalEntryId) -> Result<EntryWithLines, JournalError> {
        let entry = journal_entries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(JournalError::NotFound(id))?;
        let lines = load_lines(&self.db, entry.id).await?;
        Ok(EntryWithLines { entry, lines })
    }

    /// Lists entry headers ordered by entry number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(
        &self,
        status: Option<CoreEntryStatus>,
        page: PageRequest,
    ) -> Result<PageResponse<journal_entries::Model>, JournalError> {
        let mut query =
            journal_entries::Entity::find().order_by_asc(journal_entries::Column::EntryNumber);
        if let Some(status) = status {
            query = query.filter(journal_entries::Column::Status.eq(EntryStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Deletes a draft entry and its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or a conflict if the entry is not a draft.
    #[instrument(skip(self))]
    pub async fn delete_draft(&self, id: JournalEntryId) -> Result<(), JournalError> {
        let txn = self.db.begin().await?;
        let entry = lock_entry(&txn, id).await?;

        let status: CoreEntryStatus = entry.status.into();
        if status != CoreEntryStatus::Draft {
            return Err(LedgerError::NotDraft(status).into());
        }

        ledger_lines::Entity::delete_many()
            .filter(ledger_lines::Column::EntryId.eq(entry.id))
            .exec(&txn)
            .await?;
        journal_entries::Entity::delete_by_id(entry.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(entry_number = %entry.entry_number, "draft deleted");
        Ok(())
    }
}

/// Takes the next value of the entry number sequence under a row lock.
async fn next_entry_number(txn: &DatabaseTransaction) -> Result<String, DbErr> {
    let row = ledger_sequences::Entity::find_by_id(JOURNAL_ENTRY_SEQUENCE.to_string())
        .lock_exclusive()
        .one(txn)
        .await?;

    let value = if let Some(row) = row {
        let value = row.next_value;
        let mut active: ledger_sequences::ActiveModel = row.into();
        active.next_value = Set(value + 1);
        active.update(txn).await?;
        value
    } else {
        ledger_sequences::ActiveModel {
            name: Set(JOURNAL_ENTRY_SEQUENCE.to_string()),
            next_value: Set(2),
        }
        .insert(txn)
        .await?;
        1
    };

    Ok(format_entry_number(value))
}

async fn lock_entry(
    txn: &DatabaseTransaction,
    id: JournalEntryId,
) -> Result<journal_entries::Model, JournalError> {
    journal_entries::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(JournalError::NotFound(id))
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
) -> Result<Vec<ledger_lines::Model>, DbErr> {
    ledger_lines::Entity::find()
        .filter(ledger_lines::Column::EntryId.eq(entry_id))
        .order_by_asc(ledger_lines::Column::LineNumber)
        .all(conn)
        .await
}

fn to_line_inputs(lines: &[ledger_lines::Model]) -> Vec<LineInput> {
    lines
        .iter()
        .map(|line| LineInput {
            account_id: AccountId::from_uuid(line.account_id),
            debit_amount: line.debit_amount,
            credit_amount: line.credit_amount,
            description: line.description.clone(),
        })
        .collect()
}

fn new_header(
    entry_number: String,
    entry_type: JournalEntryType,
    description: String,
    reference: Option<String>,
    created_by: UserId,
    now: DateTime<Utc>,
) -> journal_entries::ActiveModel {
    let now: DateTimeWithTimeZone = now.into();
    journal_entries::ActiveModel {
        id: Set(JournalEntryId::new().into_inner()),
        entry_number: Set(entry_number),
        entry_type: Set(EntryType::from(entry_type)),
        description: Set(description),
        status: Set(EntryStatus::Draft),
        reference: Set(reference),
        created_by: Set(created_by.into_inner()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    entry_id: Uuid,
    lines: &[LineInput],
) -> Result<Vec<ledger_lines::Model>, DbErr> {
    let mut inserted = Vec::with_capacity(lines.len());
    for (number, line) in (1..).zip(lines) {
        let model = ledger_lines::ActiveModel {
            id: Set(LedgerLineId::new().into_inner()),
            entry_id: Set(entry_id),
            account_id: Set(line.account_id.into_inner()),
            debit_amount: Set(line.debit_amount),
            credit_amount: Set(line.credit_amount),
            description: Set(line.description.clone()),
            line_number: Set(number),
        }
        .insert(txn)
        .await?;
        inserted.push(model);
    }
    Ok(inserted)
}

/// Locks the referenced accounts in ascending id order and applies the lines.
async fn apply_lines(
    txn: &DatabaseTransaction,
    lines: &[LineInput],
    now: DateTime<Utc>,
) -> Result<(), JournalError> {
    let ids: BTreeSet<AccountId> = lines.iter().map(|line| line.account_id).collect();

    let mut locked: BTreeMap<AccountId, (accounts::Model, AccountBalance)> = BTreeMap::new();
    for id in ids {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(JournalError::AccountNotFound(id))?;
        if account.status != AccountStatus::Active {
            return Err(LedgerError::AccountInactive(id).into());
        }
        let balance = AccountBalance {
            balance: account.balance,
            debit_total: account.debit_total,
            credit_total: account.credit_total,
        };
        locked.insert(id, (account, balance));
    }

    for line in lines {
        if let Some((account, balance)) = locked.get_mut(&line.account_id) {
            *balance = balance.apply(
                account.account_type.into(),
                line.debit_amount,
                line.credit_amount,
            )?;
        }
    }

    let now: DateTimeWithTimeZone = now.into();
    for (account, balance) in locked.into_values() {
        let mut active: accounts::ActiveModel = account.into();
        active.balance = Set(balance.balance);
        active.debit_total = Set(balance.debit_total);
        active.credit_total = Set(balance.credit_total);
        active.updated_at = Set(now);
        active.update(txn).await?;
    }
    Ok(())
}

fn apply_transition(active: &mut journal_entries::ActiveModel, transition: &EntryTransition) {
    active.status = Set(transition.new_status().into());
    match transition {
        EntryTransition::Post {
            posted_by,
            posted_at,
        } => {
            active.posted_by = Set(Some(posted_by.into_inner()));
            active.posted_at = Set(Some((*posted_at).into()));
            active.updated_at = Set((*posted_at).into());
        }
        EntryTransition::Void {
            voided_by,
            voided_at,
            reason,
        } => {
            active.voided_by = Set(Some(voided_by.into_inner()));
            active.voided_at = Set(Some((*voided_at).into()));
            active.void_reason = Set(Some(reason.clone()));
            active.updated_at = Set((*voided_at).into());
        }
        EntryTransition::Reverse {
            reversed_by,
            reversed_at,
            reason,
        } => {
            active.reversed_by = Set(Some(reversed_by.into_inner()));
            active.reversed_at = Set(Some((*reversed_at).into()));
            active.reversal_reason = Set(Some(reason.clone()));
            active.updated_at = Set((*reversed_at).into());
        }
    }
}
