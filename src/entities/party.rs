//! Party entity - an economic actor that owns accounts, transactions, and budgets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Party database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    /// Unique identifier for the party
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the party
    pub name: String,
    /// When the party was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Party and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One party owns many accounts
    #[sea_orm(has_many = "super::account::Entity")]
    Accounts,
    /// One party owns many ledger transactions
    #[sea_orm(has_many = "super::ledger_transaction::Entity")]
    LedgerTransactions,
    /// One party owns many budgets
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::ledger_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerTransactions.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
