//! Ledger transaction entity - one balanced economic event.
//!
//! A ledger transaction owns two or more [`super::entry`] rows whose signed
//! amounts sum to zero. Transactions and their entries are created
//! atomically and never partially persisted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Party that owns this transaction
    pub owner_id: i64,
    /// When the economic event occurred (UTC)
    pub date: DateTimeUtc,
    /// Human-readable description
    pub description: String,
    /// Optional free-form notes
    pub notes: Option<String>,
    /// Optional external reference (e.g., a bank import id)
    pub external_id: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between LedgerTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one owning party
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::OwnerId",
        to = "super::party::Column::Id"
    )]
    Owner,
    /// One transaction owns many entries
    #[sea_orm(has_many = "super::entry::Entity")]
    Entries,
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
