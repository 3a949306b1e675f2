//! Development seeder for Tijori.
//!
//! Applies migrations, bootstraps the chart of accounts, creates two demo
//! wallets, and runs a short deposit/transfer script against them. Every
//! step is idempotent, so the seeder can be run repeatedly.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tijori_core::ledger::{AccountType, NewAccount};
use tijori_core::wallet::WalletType;
use tijori_core::ensure_account;
use tijori_db::migration::Migrator;
use tijori_db::repositories::{MovementRequest, TransferRequest};
use tijori_db::{AccountRepository, TransferProcessor, WalletRepository, connect_with};
use tijori_shared::config::LoggingConfig;
use tijori_shared::types::{UserId, WalletId};
use tijori_shared::{AppConfig, AppError};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Demo wallet owners (consistent across runs).
const DEMO_USER_A: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_00a1);
const DEMO_USER_B: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_00b2);

const CURRENCY: &str = "INR";

/// Chart of accounts bootstrap: (code, name, type).
const CHART: &[(&str, &str, AccountType)] = &[
    ("1000", "Settlement bank", AccountType::Asset),
    ("2000", "Customer wallets", AccountType::Liability),
    ("3000", "Owner equity", AccountType::Equity),
    ("4000", "Fee income", AccountType::Revenue),
    ("5000", "Payment processing costs", AccountType::Expense),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None).await.context("failed to run migrations")?;
    info!("Migrations applied");

    let accounts = AccountRepository::new(db.clone());
    let wallets = WalletRepository::new(db.clone()).with_limits(config.limits.into());
    let processor = TransferProcessor::new(db).with_config(&config.processing);

    seed_chart(&accounts).await?;

    let w1 = demo_wallet(&wallets, UserId::from_uuid(DEMO_USER_A)).await?;
    let w2 = demo_wallet(&wallets, UserId::from_uuid(DEMO_USER_B)).await?;
    for wallet in [w1, w2] {
        let account = wallets.provision_wallet(&accounts, wallet).await?;
        info!(wallet_id = %wallet, account_code = %account.code, "Wallet provisioned");
    }

    run_script(&processor, w1, w2).await?;

    for wallet in [w1, w2] {
        let balance = wallets.get_balance(wallet).await?;
        info!(
            wallet_id = %wallet,
            balance = balance.balance,
            available = balance.available_balance,
            "Final balance"
        );
    }

    info!("Seeding complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.clone().into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn seed_chart(accounts: &AccountRepository) -> anyhow::Result<()> {
    for (code, name, account_type) in CHART {
        let account = ensure_account(
            accounts,
            NewAccount {
                code: (*code).to_string(),
                name: (*name).to_string(),
                account_type: *account_type,
                currency: CURRENCY.to_string(),
                parent_id: None,
            },
        )
        .await?;
        info!(code = %account.code, account_type = %account.account_type.as_str(), "Account ready");
    }
    Ok(())
}

/// Returns the user's main INR wallet, creating it on first run.
async fn demo_wallet(wallets: &WalletRepository, user_id: UserId) -> anyhow::Result<WalletId> {
    let existing = wallets
        .list_wallets(user_id, None)
        .await?
        .into_iter()
        .find(|wallet| wallet.currency == CURRENCY);

    let wallet = match existing {
        Some(wallet) => {
            info!(wallet_id = %wallet.id, "Demo wallet already exists, skipping...");
            wallet
        }
        None => wallets.create_wallet(user_id, WalletType::Main, CURRENCY).await?,
    };
    Ok(WalletId::from_uuid(wallet.id))
}

/// Deposit, transfer, replay, and an overdraft attempt.
async fn run_script(
    processor: &TransferProcessor,
    w1: WalletId,
    w2: WalletId,
) -> anyhow::Result<()> {
    let deposit = processor
        .process_deposit(MovementRequest::new(w1, 50_000, "seed-deposit-1"))
        .await?;
    info!(replayed = deposit.replayed, "Deposited 50000 into W1");

    let transfer = processor
        .process_transfer(TransferRequest::new(w1, w2, 20_000, "seed-t1"))
        .await?;
    info!(replayed = transfer.replayed, "Transferred 20000 W1 -> W2");

    let replay = processor
        .process_transfer(TransferRequest::new(w1, w2, 20_000, "seed-t1"))
        .await?;
    info!(replayed = replay.replayed, "Replayed seed-t1");

    match processor
        .process_transfer(TransferRequest::new(w1, w2, 1_000_000_000, "seed-t2"))
        .await
        .map_err(AppError::from)
    {
        Err(AppError::BadRequest(message)) => warn!(%message, "Overdraft rejected as expected"),
        Err(err) => return Err(err.into()),
        Ok(_) => warn!("Overdraft unexpectedly succeeded"),
    }
    Ok(())
}
