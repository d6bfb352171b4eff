//! Budget store - monthly budgets and their per-category limits.
//!
//! Budgets are keyed by (owner, `"YYYY-MM"`); at most one active budget
//! exists per period. Every mutation here that can change a month's
//! allocation triggers the rollover chain, because a month's base budget
//! feeds the next month's effective budget.

use crate::{
    core::{
        month::YearMonth,
        registry, rollover,
        spend,
    },
    entities::{
        Budget, CategoryBudget, RolloverReason, budget, category_budget,
    },
    errors::{Error, Result},
    notify::{RolloverUpdate, UpdateBroadcaster},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, warn};

/// One category's allocation when creating a budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryLimitInput {
    /// Category account (EXPENSE) to budget
    pub category_id: i64,
    /// Allocation for the month
    pub budget_amount: f64,
    /// Whether this month's leftover/overspend rolls into the next month
    pub rollover_enabled: bool,
}

/// Spending health of a category or a whole budget month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetHealth {
    /// Less than 80% of the effective budget spent
    UnderBudget,
    /// 80% or more spent
    NearLimit,
    /// 100% or more spent
    OverBudget,
}

/// One category's budget position, measured against the effective budget.
#[derive(Debug, Clone)]
pub struct CategoryBudgetStatus {
    /// Category account id
    pub category_id: i64,
    /// Category account name
    pub category_name: String,
    /// User-entered allocation
    pub base_budget: f64,
    /// Cached rollover carried into the month
    pub rollover_amount: f64,
    /// `base_budget + rollover_amount`
    pub effective_budget: f64,
    /// Realized spend this month
    pub spent_amount: f64,
    /// `effective_budget - spent_amount`
    pub remaining_amount: f64,
    /// Percentage of the effective budget spent (0 when the budget is 0)
    pub percentage_used: f64,
    /// Health classification
    pub status: BudgetHealth,
}

/// A month's budget with per-category positions.
#[derive(Debug, Clone)]
pub struct BudgetOverview {
    /// The budget month
    pub month: YearMonth,
    /// Per-category positions
    pub categories: Vec<CategoryBudgetStatus>,
    /// Sum of effective budgets
    pub total_budgeted: f64,
    /// Sum of realized spend
    pub total_spent: f64,
    /// Overall health; `None` when the budget has no categories
    pub overall: Option<BudgetHealth>,
}

fn health(spent: f64, effective: f64) -> (f64, BudgetHealth) {
    let percentage = if effective > 0.0 {
        spent / effective * 100.0
    } else {
        0.0
    };
    let status = if percentage >= 100.0 {
        BudgetHealth::OverBudget
    } else if percentage >= 80.0 {
        BudgetHealth::NearLimit
    } else {
        BudgetHealth::UnderBudget
    };
    (percentage, status)
}

/// Finds the active budget of an owner for a month.
pub async fn find_budget<C>(
    db: &C,
    owner_id: i64,
    month: YearMonth,
) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .filter(budget::Column::OwnerId.eq(owner_id))
        .filter(budget::Column::YearMonth.eq(month.to_string()))
        .filter(budget::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds one category's limit row within a budget.
pub async fn find_category_budget<C>(
    db: &C,
    budget_id: i64,
    category_id: i64,
) -> Result<Option<category_budget::Model>>
where
    C: ConnectionTrait,
{
    CategoryBudget::find()
        .filter(category_budget::Column::BudgetId.eq(budget_id))
        .filter(category_budget::Column::CategoryId.eq(category_id))
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_limits(limits: &[CategoryLimitInput]) -> Result<()> {
    let mut seen = HashSet::new();
    for limit in limits {
        if !limit.budget_amount.is_finite() || limit.budget_amount < 0.0 {
            return Err(Error::InvalidAmount {
                amount: limit.budget_amount,
            });
        }
        if !seen.insert(limit.category_id) {
            return Err(Error::Validation {
                message: format!("Category {} listed twice", limit.category_id),
            });
        }
    }
    Ok(())
}

/// Creates a budget for a month with its category limits, then computes the
/// new month's own rollover (from the preceding month) and re-propagates the
/// chain for every later month.
///
/// Rejects a duplicate period, non-EXPENSE or foreign categories, negative
/// allocations, and repeated categories — persisting nothing on rejection.
pub async fn create_budget(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    owner_id: i64,
    month: YearMonth,
    limits: Vec<CategoryLimitInput>,
) -> Result<budget::Model> {
    validate_limits(&limits)?;

    if find_budget(db, owner_id, month).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Budget already exists for {month}"),
        });
    }

    for limit in &limits {
        registry::expense_category(db, owner_id, limit.category_id).await?;
    }

    let txn = db.begin().await?;

    let model = budget::ActiveModel {
        owner_id: Set(owner_id),
        year_month: Set(month.to_string()),
        is_active: Set(true),
        rollover_last_calculated: Set(None),
        rollover_needs_recalc: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for limit in &limits {
        category_budget::ActiveModel {
            budget_id: Set(model.id),
            category_id: Set(limit.category_id),
            budget_amount: Set(limit.budget_amount),
            rollover_enabled: Set(limit.rollover_enabled),
            rollover_amount: Set(0.0),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    debug!("Created budget {} for {month}", model.id);

    // The new month's own rollover depends on the preceding month; compute
    // it now, then walk the later months. The budget exists either way — a
    // recompute failure leaves the month flagged for retry.
    match rollover::recompute_budget(db, &model, month, RolloverReason::Creation).await {
        Ok(_) => {
            events
                .broadcast(RolloverUpdate { owner_id, month })
                .await;
        }
        Err(e) => {
            warn!("Initial rollover for new budget {month} failed, leaving it flagged: {e}");
        }
    }
    rollover::invalidate_and_recompute_chain(db, events, owner_id, month, RolloverReason::Creation)
        .await?;

    // Return the post-recompute row.
    find_budget(db, owner_id, month)
        .await?
        .ok_or_else(|| Error::BudgetNotFound {
            year_month: month.to_string(),
        })
}

/// Creates the budget for `to` as a copy of the one for `from`: same
/// categories, allocations, and rollover flags. Cached rollover amounts are
/// not copied; the engine recomputes them for the new month.
pub async fn copy_budget(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    owner_id: i64,
    from: YearMonth,
    to: YearMonth,
) -> Result<budget::Model> {
    let source = find_budget(db, owner_id, from)
        .await?
        .ok_or_else(|| Error::BudgetNotFound {
            year_month: from.to_string(),
        })?;

    let limits = CategoryBudget::find()
        .filter(category_budget::Column::BudgetId.eq(source.id))
        .all(db)
        .await?
        .into_iter()
        .map(|limit| CategoryLimitInput {
            category_id: limit.category_id,
            budget_amount: limit.budget_amount,
            rollover_enabled: limit.rollover_enabled,
        })
        .collect();

    create_budget(db, events, owner_id, to, limits).await
}

/// Edits one category's allocation and/or rollover flag for a month, then
/// re-propagates the chain (the month's own rollover is unaffected — it
/// derives from the month before — but every later month is).
pub async fn update_category_budget(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    owner_id: i64,
    month: YearMonth,
    category_id: i64,
    budget_amount: Option<f64>,
    rollover_enabled: Option<bool>,
) -> Result<category_budget::Model> {
    if budget_amount.is_none() && rollover_enabled.is_none() {
        return Err(Error::Validation {
            message: "Nothing to update".to_string(),
        });
    }
    if let Some(amount) = budget_amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    let target = find_budget(db, owner_id, month)
        .await?
        .ok_or_else(|| Error::BudgetNotFound {
            year_month: month.to_string(),
        })?;

    let limit = find_category_budget(db, target.id, category_id)
        .await?
        .ok_or_else(|| Error::CategoryBudgetNotFound {
            year_month: month.to_string(),
            category_id,
        })?;

    let mut active: category_budget::ActiveModel = limit.into();
    if let Some(amount) = budget_amount {
        active.budget_amount = Set(amount);
    }
    if let Some(enabled) = rollover_enabled {
        active.rollover_enabled = Set(enabled);
    }
    let updated = active.update(db).await?;

    debug!("Edited category {category_id} budget for {month}");

    rollover::invalidate_and_recompute_chain(
        db,
        events,
        owner_id,
        month,
        RolloverReason::BudgetEdit,
    )
    .await?;

    Ok(updated)
}

/// A month's budget with its category limit rows.
pub async fn get_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    month: YearMonth,
) -> Result<(budget::Model, Vec<category_budget::Model>)> {
    let target = find_budget(db, owner_id, month)
        .await?
        .ok_or_else(|| Error::BudgetNotFound {
            year_month: month.to_string(),
        })?;

    let limits = CategoryBudget::find()
        .filter(category_budget::Column::BudgetId.eq(target.id))
        .order_by_asc(category_budget::Column::CategoryId)
        .all(db)
        .await?;

    Ok((target, limits))
}

/// Per-category budget positions for a month, measured against effective
/// budgets (base + rollover).
pub async fn budget_overview(
    db: &DatabaseConnection,
    owner_id: i64,
    month: YearMonth,
) -> Result<BudgetOverview> {
    let (_, limits) = get_budget(db, owner_id, month).await?;

    let mut categories = Vec::with_capacity(limits.len());
    let mut total_budgeted = 0.0;
    let mut total_spent = 0.0;

    for limit in limits {
        let account = registry::get_account(db, limit.category_id)
            .await?
            .ok_or(Error::AccountNotFound {
                id: limit.category_id,
            })?;

        let effective_budget = limit.budget_amount + limit.rollover_amount;
        let spent_amount =
            spend::spend_for_month(db, owner_id, limit.category_id, month).await?;
        let (percentage_used, status) = health(spent_amount, effective_budget);

        total_budgeted += effective_budget;
        total_spent += spent_amount;

        categories.push(CategoryBudgetStatus {
            category_id: limit.category_id,
            category_name: account.name,
            base_budget: limit.budget_amount,
            rollover_amount: limit.rollover_amount,
            effective_budget,
            spent_amount,
            remaining_amount: effective_budget - spent_amount,
            percentage_used,
            status,
        });
    }

    let overall = if categories.is_empty() {
        None
    } else {
        Some(health(total_spent, total_budgeted).1)
    };

    Ok(BudgetOverview {
        month,
        categories,
        total_budgeted,
        total_spent,
        overall,
    })
}
