//! `SeaORM` Entity for journal entry headers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntryStatus, EntryType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub entry_number: String,
    pub entry_type: EntryType,
    pub description: String,
    pub status: EntryStatus,
    pub reference: Option<String>,
    pub created_by: Uuid,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub posted_by: Option<Uuid>,
    pub voided_at: Option<DateTimeWithTimeZone>,
    pub voided_by: Option<Uuid>,
    pub void_reason: Option<String>,
    pub reversed_at: Option<DateTimeWithTimeZone>,
    pub reversed_by: Option<Uuid>,
    pub reversal_reason: Option<String>,
    pub reverses_entry_id: Option<Uuid>,
    pub reversed_by_entry_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_lines::Entity")]
    LedgerLines,
}

impl Related<super::ledger_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
