//! Core business logic for Tijori.
//!
//! This crate contains pure business logic with ZERO database dependencies.
//! All domain types, validation rules, and calculations live here; the `db`
//! crate runs them inside database transactions.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping rules and the journal entry lifecycle
//! - `wallet` - Wallet status rules and balance/hold arithmetic
//! - `limits` - Daily/monthly spend windows with lazy reset
//! - `transfer` - Transfer, deposit, and withdrawal planning
//! - `events` - Domain events emitted after commits
//! - `ports` - Collaborator interfaces the core depends on
//! - `clock` - Injectable time source

pub mod clock;
pub mod events;
pub mod ledger;
pub mod limits;
pub mod ports;
pub mod transfer;
pub mod wallet;

pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{DomainEvent, EventPublisher, RecordingPublisher};
pub use ports::{LedgerPort, ensure_account, wallet_ledger_account};
