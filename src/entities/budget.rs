//! Budget entity - one party's budget for one calendar month.
//!
//! At most one active budget exists per (owner, `year_month`). The
//! `rollover_needs_recalc` flag marks a month whose cached rollover values
//! are stale; the rollover engine clears it when a recomputation commits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Party that owns this budget
    pub owner_id: i64,
    /// Budget period, zero-padded `"YYYY-MM"` (lexicographic order is
    /// chronological order)
    pub year_month: String,
    /// Whether this budget is active
    pub is_active: bool,
    /// When the rollover engine last committed values for this month
    pub rollover_last_calculated: Option<DateTimeUtc>,
    /// Whether cached rollover values for this month are stale
    pub rollover_needs_recalc: bool,
    /// When the budget was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one owning party
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::OwnerId",
        to = "super::party::Column::Id"
    )]
    Owner,
    /// One budget has many per-category limits
    #[sea_orm(has_many = "super::category_budget::Entity")]
    CategoryBudgets,
    /// One budget has many rollover calculation records
    #[sea_orm(has_many = "super::rollover_calculation::Entity")]
    RolloverCalculations,
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::category_budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryBudgets.def()
    }
}

impl Related<super::rollover_calculation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolloverCalculations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
