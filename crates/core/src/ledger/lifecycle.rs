//! Journal entry lifecycle transitions.
//!
//! This module implements the state machine for moving journal entries
//! through `Draft → Posted → {Voided, Reversed}`. Persistence applies the
//! returned transition inside a database transaction.

use chrono::{DateTime, Utc};
use tijori_shared::types::UserId;

use super::error::LedgerError;
use super::types::EntryStatus;
use super::validation::{validate_reversal_reason, validate_void_reason};

/// A validated status change with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTransition {
    /// Draft → Posted.
    Post {
        /// User posting the entry.
        posted_by: UserId,
        /// When the entry was posted.
        posted_at: DateTime<Utc>,
    },
    /// Posted → Voided.
    Void {
        /// User voiding the entry.
        voided_by: UserId,
        /// When the entry was voided.
        voided_at: DateTime<Utc>,
        /// Why.
        reason: String,
    },
    /// Posted → Reversed.
    Reverse {
        /// User reversing the entry.
        reversed_by: UserId,
        /// When the reversal was booked.
        reversed_at: DateTime<Utc>,
        /// Why.
        reason: String,
    },
}

impl EntryTransition {
    /// Returns the status the entry moves to.
    #[must_use]
    pub const fn new_status(&self) -> EntryStatus {
        match self {
            Self::Post { .. } => EntryStatus::Posted,
            Self::Void { .. } => EntryStatus::Voided,
            Self::Reverse { .. } => EntryStatus::Reversed,
        }
    }
}

/// Stateless service for journal entry transitions.
pub struct EntryLifecycle;

impl EntryLifecycle {
    /// Post a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` if the entry is not in `Draft`.
    pub fn post(
        current: EntryStatus,
        posted_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<EntryTransition, LedgerError> {
        match current {
            EntryStatus::Draft => Ok(EntryTransition::Post {
                posted_by,
                posted_at: now,
            }),
            other => Err(LedgerError::NotDraft(other)),
        }
    }

    /// Void a posted entry. Void has no balance effect.
    ///
    /// # Errors
    ///
    /// Returns `NotPosted` if the entry is not `Posted`, or `ReasonRequired`.
    pub fn void(
        current: EntryStatus,
        voided_by: UserId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<EntryTransition, LedgerError> {
        if current != EntryStatus::Posted {
            return Err(LedgerError::NotPosted(current));
        }
        validate_void_reason(&reason)?;
        Ok(EntryTransition::Void {
            voided_by,
            voided_at: now,
            reason,
        })
    }

    /// Reverse a posted entry.
    ///
    /// # Errors
    ///
    /// Returns `NotPosted` if the entry is not `Posted`, or `ReasonTooShort`.
    pub fn reverse(
        current: EntryStatus,
        reversed_by: UserId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<EntryTransition, LedgerError> {
        if current != EntryStatus::Posted {
            return Err(LedgerError::NotPosted(current));
        }
        validate_reversal_reason(&reason)?;
        Ok(EntryTransition::Reverse {
            reversed_by,
            reversed_at: now,
            reason,
        })
    }
}
