//! Rollover calculation entity - append-only audit trail of the engine.
//!
//! One row is inserted for every rollover recomputation, capturing all
//! intermediate values. Rows are never updated or deleted; the crate exposes
//! no mutation path for this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Why a rollover value was recomputed.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum RolloverReason {
    /// The budget month was just created (or copied)
    #[sea_orm(string_value = "creation")]
    Creation,
    /// A caller explicitly requested recalculation
    #[sea_orm(string_value = "manual_recalculation")]
    ManualRecalculation,
    /// An earlier month in the chain changed
    #[sea_orm(string_value = "chain_propagation")]
    ChainPropagation,
    /// A budget allocation for an earlier month was edited
    #[sea_orm(string_value = "budget_edit")]
    BudgetEdit,
    /// A ledger transaction in an earlier month was created, edited, or deleted
    #[sea_orm(string_value = "transaction_edit")]
    TransactionEdit,
}

/// Rollover calculation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rollover_calculations")]
pub struct Model {
    /// Unique identifier for the calculation record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Budget (month) the value was computed for
    pub budget_id: i64,
    /// Category account the value was computed for
    pub category_id: i64,
    /// When the calculation ran
    pub calculated_at: DateTimeUtc,
    /// The computed signed rollover amount
    pub rollover_amount: f64,
    /// The prior month (`"YYYY-MM"`) whose budget produced this value
    pub source_month: String,
    /// Why the recomputation ran
    pub reason: RolloverReason,
    /// The source month's user-entered allocation
    pub base_budget: f64,
    /// The source month's cached rollover at calculation time
    pub prev_rollover: f64,
    /// `base_budget + prev_rollover`
    pub effective_budget: f64,
    /// Realized spend in the source month
    pub spent_amount: f64,
}

/// Defines relationships between RolloverCalculation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each calculation record belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
    /// Each calculation record references one category account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::CategoryId",
        to = "super::account::Column::Id"
    )]
    Category,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
