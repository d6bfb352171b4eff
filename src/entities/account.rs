//! Account entity - the chart of accounts.
//!
//! Accounts carry a double-entry kind (asset, liability, income, expense).
//! Budget categories are EXPENSE accounts; the `parent_id` column forms an
//! optional tree used for lookup and display only, never for balance
//! aggregation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Double-entry account classification.
///
/// Positive (debit) entries increase ASSET/EXPENSE accounts and decrease
/// LIABILITY/INCOME accounts; negative (credit) entries do the reverse.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountKind {
    /// Cash, bank accounts, reimbursable balances
    #[sea_orm(string_value = "ASSET")]
    Asset,
    /// Credit cards, loans
    #[sea_orm(string_value = "LIABILITY")]
    Liability,
    /// Salary and other income sources
    #[sea_orm(string_value = "INCOME")]
    Income,
    /// Spending categories
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
}

/// Account database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Party that owns this account
    pub owner_id: i64,
    /// Human-readable name (e.g., "Cash", "Groceries")
    pub name: String,
    /// Double-entry classification of the account
    pub kind: AccountKind,
    /// Optional parent account, for lookup/display grouping only
    pub parent_id: Option<i64>,
    /// Whether the account is active; inactive accounts are hidden from lookups
    pub is_active: bool,
    /// ISO 4217 currency code (single-currency core; no conversion)
    pub currency: String,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each account belongs to one owning party
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::OwnerId",
        to = "super::party::Column::Id"
    )]
    Owner,
    /// One account has many ledger entries
    #[sea_orm(has_many = "super::entry::Entity")]
    Entries,
    /// One account (category) has many category budgets
    #[sea_orm(has_many = "super::category_budget::Entity")]
    CategoryBudgets,
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

impl Related<super::category_budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryBudgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
