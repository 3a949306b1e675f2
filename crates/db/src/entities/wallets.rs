//! `SeaORM` Entity for wallets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{WalletStatus, WalletType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_type: WalletType,
    pub currency: String,
    pub balance: i64,
    pub available_balance: i64,
    pub status: WalletStatus,
    /// Reconciliation link only; not a foreign key.
    pub ledger_account_id: Option<Uuid>,
    pub metadata: Option<Json>,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub close_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::wallet_limits::Entity")]
    WalletLimits,
}

impl Related<super::wallet_limits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletLimits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
