//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and written with the schema
//! builder so they run on `PostgreSQL` and on `SQLite` (integration tests).

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_ledger;
mod m20261019_000002_wallets;

pub use m20261019_000001_ledger::JOURNAL_ENTRY_SEQUENCE;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_ledger::Migration),
            Box::new(m20261019_000002_wallets::Migration),
        ]
    }
}
