//! Database layer with `SeaORM` entities, migrations, and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Schema migrations
//! - The chart of accounts, journal, wallet, and limit repositories
//! - The transfer/deposit/withdrawal processor

pub mod entities;
pub mod error;
pub mod events;
pub mod migration;
pub mod repositories;

pub use events::TracingEventPublisher;
pub use repositories::{
    AccountRepository, JournalRepository, LimitRepository, TransferProcessor, WalletRepository,
};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tijori_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
