//! Transfer, deposit, and withdrawal planning.
//!
//! The processor in the `db` crate locks wallet rows and hands their
//! snapshots to these functions, which validate the movement and return the
//! balances to persist.
//!
//! - `types` - Transaction keys and receipts
//! - `plan` - Validation and balance computation
//! - `error` - Transfer error types

pub mod error;
pub mod plan;
pub mod types;

#[cfg(test)]
mod plan_props;

pub use error::TransferError;
pub use plan::{TransferPlan, plan_deposit, plan_transfer, plan_withdrawal, validate_transfer};
pub use types::{MAX_TRANSACTION_KEY_LEN, OperationKind, Receipt, TransactionKey};
