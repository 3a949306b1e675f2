//! Property-based tests for transfer planning.

use proptest::prelude::*;
use tijori_shared::types::{UserId, WalletId};

use super::plan::plan_transfer;
use crate::wallet::{WalletBalance, WalletSnapshot, WalletStatus};

fn wallet(balance: i64, held: i64) -> WalletSnapshot {
    WalletSnapshot {
        id: WalletId::new(),
        user_id: UserId::new(),
        currency: "INR".into(),
        status: WalletStatus::Active,
        balance: WalletBalance::new(balance, balance - held),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* successful transfer, the sum of both balances is unchanged.
    #[test]
    fn prop_transfer_conserves_funds(
        source_balance in 0i64..1_000_000_000,
        held_pct in 0i64..=100,
        destination_balance in 0i64..1_000_000_000,
        amount in 1i64..1_000_000_000,
    ) {
        let held = source_balance * held_pct / 100;
        let source = wallet(source_balance, held);
        let destination = wallet(destination_balance, 0);

        match plan_transfer(&source, &destination, amount) {
            Ok(plan) => {
                prop_assert!(amount <= source.balance.available_balance);
                prop_assert_eq!(
                    plan.source.balance + plan.destination.balance,
                    source_balance + destination_balance
                );
                prop_assert_eq!(plan.source.held(), held);
                prop_assert!(plan.source.available_balance >= 0);
            }
            Err(_) => prop_assert!(amount > source.balance.available_balance),
        }
    }
}
