//! `SeaORM` entity definitions.

pub mod accounts;
pub mod journal_entries;
pub mod ledger_lines;
pub mod ledger_sequences;
pub mod processed_deposits;
pub mod processed_transfers;
pub mod processed_withdrawals;
pub mod sea_orm_active_enums;
pub mod wallet_limits;
pub mod wallets;
