//! Wallets, spend limits, and idempotency markers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn money(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).big_integer().not_null().default(0).to_owned()
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wallets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Wallets::UserId).uuid().not_null())
                    .col(ColumnDef::new(Wallets::WalletType).string_len(16).not_null())
                    .col(ColumnDef::new(Wallets::Currency).string_len(3).not_null())
                    .col(money(Wallets::Balance))
                    .col(money(Wallets::AvailableBalance))
                    .col(
                        ColumnDef::new(Wallets::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Wallets::LedgerAccountId).uuid().null())
                    .col(ColumnDef::new(Wallets::Metadata).json().null())
                    .col(ColumnDef::new(Wallets::ClosedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Wallets::CloseReason).text().null())
                    .col(timestamp(Wallets::CreatedAt))
                    .col(timestamp(Wallets::UpdatedAt))
                    .check(Expr::cust(
                        "available_balance >= 0 AND available_balance <= balance",
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_wallets_user_type_currency")
                    .table(Wallets::Table)
                    .col(Wallets::UserId)
                    .col(Wallets::WalletType)
                    .col(Wallets::Currency)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalletLimits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletLimits::WalletId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(money(WalletLimits::DailyLimit))
                    .col(money(WalletLimits::DailySpent))
                    .col(timestamp(WalletLimits::DailyResetAt))
                    .col(money(WalletLimits::MonthlyLimit))
                    .col(money(WalletLimits::MonthlySpent))
                    .col(timestamp(WalletLimits::MonthlyResetAt))
                    .col(timestamp(WalletLimits::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_limits_wallet")
                            .from(WalletLimits::Table, WalletLimits::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProcessedTransfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessedTransfers::TransactionId)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProcessedTransfers::SourceWalletId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProcessedTransfers::DestinationWalletId)
                            .uuid()
                            .not_null(),
                    )
                    .col(money(ProcessedTransfers::Amount))
                    .col(timestamp(ProcessedTransfers::ProcessedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProcessedDeposits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessedDeposits::TransactionId)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProcessedDeposits::WalletId).uuid().not_null())
                    .col(money(ProcessedDeposits::Amount))
                    .col(
                        ColumnDef::new(ProcessedDeposits::Status)
                            .string_len(16)
                            .not_null()
                            .default("completed"),
                    )
                    .col(timestamp(ProcessedDeposits::ProcessedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProcessedWithdrawals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessedWithdrawals::TransactionId)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProcessedWithdrawals::WalletId).uuid().not_null())
                    .col(money(ProcessedWithdrawals::Amount))
                    .col(timestamp(ProcessedWithdrawals::ProcessedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProcessedWithdrawals::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProcessedDeposits::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProcessedTransfers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletLimits::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Wallets {
    Table,
    Id,
    UserId,
    WalletType,
    Currency,
    Balance,
    AvailableBalance,
    Status,
    LedgerAccountId,
    Metadata,
    ClosedAt,
    CloseReason,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WalletLimits {
    Table,
    WalletId,
    DailyLimit,
    DailySpent,
    DailyResetAt,
    MonthlyLimit,
    MonthlySpent,
    MonthlyResetAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProcessedTransfers {
    Table,
    TransactionId,
    SourceWalletId,
    DestinationWalletId,
    Amount,
    ProcessedAt,
}

#[derive(DeriveIden)]
enum ProcessedDeposits {
    Table,
    TransactionId,
    WalletId,
    Amount,
    Status,
    ProcessedAt,
}

#[derive(DeriveIden)]
enum ProcessedWithdrawals {
    Table,
    TransactionId,
    WalletId,
    Amount,
    ProcessedAt,
}
