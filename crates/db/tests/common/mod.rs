//! Shared setup for integration tests: an in-memory SQLite database with
//! every migration applied, plus helpers for seeding wallets.
//!
//! Tests that need real row-lock contention also run against Postgres when
//! `DATABASE_URL` (or `TIJORI__DATABASE__URL`) points at one, and are
//! skipped otherwise.

#![allow(dead_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tokio::sync::Mutex;
use tijori_core::ledger::{AccountType, NewAccount};
use tijori_core::wallet::WalletType;
use tijori_core::{FixedClock, RecordingPublisher};
use tijori_db::entities::sea_orm_active_enums::{
    AccountStatus, AccountType as DbAccountType, WalletStatus, WalletType as DbWalletType,
};
use tijori_db::entities::{accounts, processed_transfers, wallets};
use tijori_db::migration::Migrator;
use tijori_db::repositories::{MovementRequest, TransferProcessor, WalletRepository};
use tijori_db::{AccountRepository, JournalRepository, LimitRepository};
use tijori_shared::config::DatabaseConfig;
use tijori_shared::types::{AccountId, UserId, WalletId};

/// Opens a fresh in-memory database and runs all migrations.
///
/// The pool keeps exactly one connection alive for the lifetime of the test;
/// every in-memory SQLite connection is its own database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(3600))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// Migrations run once per test binary; tests share the Postgres database.
static POSTGRES_MIGRATED: Mutex<bool> = Mutex::const_new(false);

fn get_postgres_url() -> Option<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("TIJORI__DATABASE__URL"))
        .ok()
        .filter(|url| url.starts_with("postgres"))
}

/// Connects to Postgres with a pool wide enough for real contention.
///
/// Returns `None` when no Postgres URL is configured or it is unreachable.
pub async fn setup_postgres() -> Option<DatabaseConnection> {
    let Some(url) = get_postgres_url() else {
        eprintln!("Skipping test - DATABASE_URL is not a postgres URL");
        return None;
    };

    let config = DatabaseConfig {
        url,
        max_connections: 32,
        min_connections: 1,
    };
    let db = match tijori_db::connect_with(&config).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {e}");
            return None;
        }
    };

    let mut migrated = POSTGRES_MIGRATED.lock().await;
    if !*migrated {
        Migrator::up(&db, None).await.expect("run migrations");
        *migrated = true;
    }
    Some(db)
}

/// A unique account code, for databases shared between runs.
pub fn unique_code(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::now_v7().simple())
}

/// 2026-10-19 10:00 UTC, a Monday.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
}

/// Repositories wired to one database, one pinned clock, and one recorder.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub clock: Arc<FixedClock>,
    pub events: Arc<RecordingPublisher>,
    pub accounts: AccountRepository,
    pub journal: JournalRepository,
    pub wallets: WalletRepository,
    pub limits: LimitRepository,
    pub processor: TransferProcessor,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_db(setup_db().await)
    }

    /// A context on Postgres, or `None` if the test should be skipped.
    pub async fn postgres() -> Option<Self> {
        Some(Self::with_db(setup_postgres().await?))
    }

    pub fn with_db(db: DatabaseConnection) -> Self {
        let clock = Arc::new(FixedClock::new(start_time()));
        let events = Arc::new(RecordingPublisher::new());

        Self {
            accounts: AccountRepository::new(db.clone()).with_clock(clock.clone()),
            journal: JournalRepository::new(db.clone())
                .with_clock(clock.clone())
                .with_publisher(events.clone()),
            wallets: WalletRepository::new(db.clone())
                .with_clock(clock.clone())
                .with_publisher(events.clone()),
            limits: LimitRepository::new(db.clone()).with_clock(clock.clone()),
            processor: TransferProcessor::new(db.clone())
                .with_clock(clock.clone())
                .with_publisher(events.clone()),
            db,
            clock,
            events,
        }
    }

    /// Creates an active INR main wallet for a new user.
    pub async fn wallet(&self) -> WalletId {
        self.wallet_in("INR").await
    }

    /// Creates an active main wallet in `currency` for a new user.
    pub async fn wallet_in(&self, currency: &str) -> WalletId {
        let wallet = self
            .wallets
            .create_wallet(UserId::new(), WalletType::Main, currency)
            .await
            .expect("create wallet");
        WalletId::from_uuid(wallet.id)
    }

    /// Creates a wallet and deposits `amount` into it.
    pub async fn funded_wallet(&self, amount: i64) -> WalletId {
        let wallet = self.wallet().await;
        self.deposit(wallet, amount).await;
        wallet
    }

    /// Deposits under a fresh transaction ID.
    pub async fn deposit(&self, wallet: WalletId, amount: i64) {
        self.processor
            .process_deposit(MovementRequest::new(
                wallet,
                amount,
                format!("dep-{}", uuid::Uuid::now_v7()),
            ))
            .await
            .expect("deposit");
    }

    pub async fn balance(&self, wallet: WalletId) -> i64 {
        self.wallets
            .get_balance(wallet)
            .await
            .expect("get balance")
            .balance
    }

    /// Creates an INR account in the chart of accounts.
    pub async fn account(&self, code: &str, account_type: AccountType) -> AccountId {
        let account = self
            .accounts
            .create_account(NewAccount {
                code: code.to_string(),
                name: format!("Account {code}"),
                account_type,
                currency: "INR".to_string(),
                parent_id: None,
            })
            .await
            .expect("create account");
        AccountId::from_uuid(account.id)
    }
}

/// A raw INR main wallet row, bypassing the repository's pre-check.
pub fn wallet_row(user_id: UserId) -> wallets::ActiveModel {
    let now = start_time().into();
    wallets::ActiveModel {
        id: Set(WalletId::new().into_inner()),
        user_id: Set(user_id.into_inner()),
        wallet_type: Set(DbWalletType::Main),
        currency: Set("INR".into()),
        balance: Set(0),
        available_balance: Set(0),
        status: Set(WalletStatus::Active),
        ledger_account_id: Set(None),
        metadata: Set(None),
        closed_at: Set(None),
        close_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// A raw asset account row, bypassing the repository's pre-check.
pub fn account_row(code: &str) -> accounts::ActiveModel {
    let now = start_time().into();
    accounts::ActiveModel {
        id: Set(AccountId::new().into_inner()),
        code: Set(code.to_string()),
        name: Set(format!("Account {code}")),
        account_type: Set(DbAccountType::Asset),
        currency: Set("INR".into()),
        balance: Set(0),
        debit_total: Set(0),
        credit_total: Set(0),
        status: Set(AccountStatus::Active),
        parent_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// A raw transfer idempotency marker.
pub fn transfer_marker(
    key: &str,
    source: WalletId,
    destination: WalletId,
    amount: i64,
) -> processed_transfers::ActiveModel {
    processed_transfers::ActiveModel {
        transaction_id: Set(key.to_string()),
        source_wallet_id: Set(source.into_inner()),
        destination_wallet_id: Set(destination.into_inner()),
        amount: Set(amount),
        processed_at: Set(start_time().into()),
    }
}
