//! Entry entity - one signed posting within a ledger transaction.
//!
//! Sign convention: positive = debit, negative = credit. The journal
//! enforces that a transaction's entries sum to zero; it does not check an
//! entry's sign against its account kind.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Transaction this entry belongs to
    pub transaction_id: i64,
    /// Account this entry posts against
    pub account_id: i64,
    /// Signed amount (positive = debit, negative = credit)
    pub amount: f64,
    /// Whether this entry counts toward spend aggregation; transfer legs
    /// and reimbursable shares are recorded with `false`
    pub is_reportable: bool,
}

/// Defines relationships between Entry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one ledger transaction
    #[sea_orm(
        belongs_to = "super::ledger_transaction::Entity",
        from = "Column::TransactionId",
        to = "super::ledger_transaction::Column::Id"
    )]
    Transaction,
    /// Each entry posts against one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::ledger_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
