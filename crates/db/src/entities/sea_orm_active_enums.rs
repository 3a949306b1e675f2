//! String-backed enums stored in `VARCHAR(16)` columns.
//!
//! Each enum converts to and from its `tijori_core` counterpart.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tijori_core::{ledger, wallet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[sea_orm(string_value = "standard")]
    Standard,
    #[sea_orm(string_value = "opening")]
    Opening,
    #[sea_orm(string_value = "closing")]
    Closing,
    #[sea_orm(string_value = "adjusting")]
    Adjusting,
    #[sea_orm(string_value = "reversing")]
    Reversing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "voided")]
    Voided,
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    #[sea_orm(string_value = "main")]
    Main,
    #[sea_orm(string_value = "savings")]
    Savings,
    #[sea_orm(string_value = "rewards")]
    Rewards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "frozen")]
    Frozen,
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Progress of a deposit marker.
///
/// `Confirmed` is only seen between the two steps of an external deposit
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
}

macro_rules! mirror_enum {
    ($db:ident, $core:path, [$($variant:ident),+ $(,)?]) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $(<$core>::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType, ledger::AccountType, [Asset, Liability, Equity, Revenue, Expense]);
mirror_enum!(AccountStatus, ledger::AccountStatus, [Active, Inactive]);
mirror_enum!(EntryType, ledger::JournalEntryType, [Standard, Opening, Closing, Adjusting, Reversing]);
mirror_enum!(EntryStatus, ledger::EntryStatus, [Draft, Posted, Voided, Reversed]);
mirror_enum!(WalletType, wallet::WalletType, [Main, Savings, Rewards]);
mirror_enum!(WalletStatus, wallet::WalletStatus, [Active, Frozen, Closed]);
