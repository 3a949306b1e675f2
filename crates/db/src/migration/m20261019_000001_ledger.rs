//! Chart of accounts and journal tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Sequence row backing `JE-` entry numbers.
pub const JOURNAL_ENTRY_SEQUENCE: &str = "journal_entry";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Accounts::Code)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Accounts::AccountType).string_len(16).not_null())
                    .col(ColumnDef::new(Accounts::Currency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::DebitTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreditTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Accounts::ParentId).uuid().null())
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_parent")
                            .from(Accounts::Table, Accounts::ParentId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_type_status")
                    .table(Accounts::Table)
                    .col(Accounts::AccountType)
                    .col(Accounts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JournalEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JournalEntries::EntryNumber)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(JournalEntries::EntryType).string_len(16).not_null())
                    .col(ColumnDef::new(JournalEntries::Description).text().not_null())
                    .col(ColumnDef::new(JournalEntries::Status).string_len(16).not_null())
                    .col(ColumnDef::new(JournalEntries::Reference).string_len(128).null())
                    .col(ColumnDef::new(JournalEntries::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(JournalEntries::PostedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(JournalEntries::PostedBy).uuid().null())
                    .col(ColumnDef::new(JournalEntries::VoidedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(JournalEntries::VoidedBy).uuid().null())
                    .col(ColumnDef::new(JournalEntries::VoidReason).text().null())
                    .col(ColumnDef::new(JournalEntries::ReversedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(JournalEntries::ReversedBy).uuid().null())
                    .col(ColumnDef::new(JournalEntries::ReversalReason).text().null())
                    .col(ColumnDef::new(JournalEntries::ReversesEntryId).uuid().null())
                    .col(ColumnDef::new(JournalEntries::ReversedByEntryId).uuid().null())
                    .col(
                        ColumnDef::new(JournalEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JournalEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_entries_reverses")
                            .from(JournalEntries::Table, JournalEntries::ReversesEntryId)
                            .to(JournalEntries::Table, JournalEntries::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_entries_reversed_by")
                            .from(JournalEntries::Table, JournalEntries::ReversedByEntryId)
                            .to(JournalEntries::Table, JournalEntries::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_entries_status")
                    .table(JournalEntries::Table)
                    .col(JournalEntries::Status)
                    .col(JournalEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerLines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LedgerLines::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LedgerLines::EntryId).uuid().not_null())
                    .col(ColumnDef::new(LedgerLines::AccountId).uuid().not_null())
                    .col(
                        ColumnDef::new(LedgerLines::DebitAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LedgerLines::CreditAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LedgerLines::Description).text().null())
                    .col(ColumnDef::new(LedgerLines::LineNumber).integer().not_null())
                    .check(Expr::cust(
                        "(debit_amount > 0 AND credit_amount = 0) OR (debit_amount = 0 AND credit_amount > 0)",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_lines_entry")
                            .from(LedgerLines::Table, LedgerLines::EntryId)
                            .to(JournalEntries::Table, JournalEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_lines_account")
                            .from(LedgerLines::Table, LedgerLines::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_lines_entry")
                    .table(LedgerLines::Table)
                    .col(LedgerLines::EntryId)
                    .col(LedgerLines::LineNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_lines_account")
                    .table(LedgerLines::Table)
                    .col(LedgerLines::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerSequences::Name)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerSequences::NextValue)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(LedgerSequences::Table)
                    .columns([LedgerSequences::Name, LedgerSequences::NextValue])
                    .values_panic([JOURNAL_ENTRY_SEQUENCE.into(), 1i64.into()])
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerLines::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalEntries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerSequences::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Code,
    Name,
    AccountType,
    Currency,
    Balance,
    DebitTotal,
    CreditTotal,
    Status,
    ParentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JournalEntries {
    Table,
    Id,
    EntryNumber,
    EntryType,
    Description,
    Status,
    Reference,
    CreatedBy,
    PostedAt,
    PostedBy,
    VoidedAt,
    VoidedBy,
    VoidReason,
    ReversedAt,
    ReversedBy,
    ReversalReason,
    ReversesEntryId,
    ReversedByEntryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LedgerLines {
    Table,
    Id,
    EntryId,
    AccountId,
    DebitAmount,
    CreditAmount,
    Description,
    LineNumber,
}

#[derive(DeriveIden)]
enum LedgerSequences {
    Table,
    Name,
    NextValue,
}
