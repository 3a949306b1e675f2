//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `WalletId` where an `AccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a wallet owner.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(JournalEntryId, "Unique identifier for a journal entry.");
typed_id!(LedgerLineId, "Unique identifier for a journal entry line.");
typed_id!(WalletId, "Unique identifier for a wallet.");

impl WalletId {
    /// Orders two wallet IDs for lock acquisition.
    ///
    /// Locks are always taken on the lower ID first, regardless of which side
    /// of a transfer each wallet is on. UUID byte order matches the
    /// lexicographic order of the lowercase hyphenated text form.
    #[must_use]
    pub fn lock_order(a: Self, b: Self) -> [Self; 2] {
        if a <= b {
            [a, b]
        } else {
            [b, a]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = WalletId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_typed_id_from_str() {
        let uuid = Uuid::new_v4();
        let id = AccountId::from_str(&uuid.to_string()).unwrap();
        assert_eq!(id.into_inner(), uuid);
        assert!(AccountId::from_str("invalid").is_err());
    }

    #[test]
    fn test_lock_order_is_direction_independent() {
        let a = WalletId::from_str("00000000-0000-0000-0000-00000000000a").unwrap();
        let b = WalletId::from_str("00000000-0000-0000-0000-00000000000b").unwrap();
        assert_eq!(WalletId::lock_order(a, b), [a, b]);
        assert_eq!(WalletId::lock_order(b, a), [a, b]);
    }

    #[test]
    fn test_lock_order_is_lexicographic() {
        // "9..." sorts before "a..." as text.
        let low = WalletId::from_str("9fffffff-0000-0000-0000-000000000000").unwrap();
        let high = WalletId::from_str("a0000000-0000-0000-0000-000000000000").unwrap();
        assert_eq!(WalletId::lock_order(high, low), [low, high]);
    }
}
