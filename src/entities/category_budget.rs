//! Category budget entity - one category's allocation within a monthly budget.
//!
//! `rollover_amount` is a derived, cached value written exclusively by the
//! rollover engine, never by user input. The effective budget for the month
//! is `budget_amount + rollover_amount`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category_budgets")]
pub struct Model {
    /// Unique identifier for the category budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Budget (month) this limit belongs to
    pub budget_id: i64,
    /// Category account (EXPENSE) this limit applies to
    pub category_id: i64,
    /// User-entered allocation for the month
    pub budget_amount: f64,
    /// Whether this month's leftover or overspend rolls into the next month
    pub rollover_enabled: bool,
    /// Cached signed rollover carried into this month from the previous one
    pub rollover_amount: f64,
}

/// Defines relationships between CategoryBudget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category budget belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
    /// Each category budget references one category account
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
