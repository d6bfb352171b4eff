//! Budget rollover engine - month-to-month propagation of unused or
//! overspent category budgets.
//!
//! A category's rollover for month M is derived entirely from month M−1:
//! `(base budget + cached rollover) − realized spend`, carried forward when
//! the source month has rollover enabled. The cached values form a chain, so
//! any change to a past month invalidates every later month. The chain is
//! materialized as an ordered work list keyed by the `"YYYY-MM"` string and
//! walked strictly ascending: month N+1 reads only the already-committed
//! result of month N, never a recursive call.
//!
//! Each month commits in its own database transaction. The walk itself is
//! deliberately not one outer transaction: a failing month rolls back, keeps
//! its `rollover_needs_recalc` flag, and the walk continues, so one bad
//! month cannot block the rest of the chain. Stale downstream values are
//! corrected by the next full walk once the bad month is fixed.

use crate::{
    core::{
        budget::{find_budget, find_category_budget},
        month::YearMonth,
        spend,
    },
    entities::{
        Budget, CategoryBudget, RolloverReason, budget, category_budget, rollover_calculation,
    },
    errors::{Error, Result},
    notify::{RolloverUpdate, UpdateBroadcaster},
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, warn};

/// Minimum change in a cached rollover amount worth writing back; smaller
/// deltas are floating-point churn, not information.
pub const ROLLOVER_WRITE_THRESHOLD: f64 = 0.01;

/// All intermediate values of one rollover calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloverOutcome {
    /// The prior month the value is derived from
    pub source_month: YearMonth,
    /// The source month's user-entered allocation
    pub base_budget: f64,
    /// The source month's cached rollover at calculation time
    pub prev_rollover: f64,
    /// `base_budget + prev_rollover`
    pub effective_budget: f64,
    /// Realized spend in the source month
    pub spent_amount: f64,
    /// The resulting signed rollover for the target month
    pub rollover_amount: f64,
}

impl RolloverOutcome {
    /// The no-prior-allocation base case: everything zero.
    const fn base_case(source_month: YearMonth) -> Self {
        Self {
            source_month,
            base_budget: 0.0,
            prev_rollover: 0.0,
            effective_budget: 0.0,
            spent_amount: 0.0,
            rollover_amount: 0.0,
        }
    }
}

/// Summary of one month's recomputation.
#[derive(Debug, Clone)]
pub struct MonthRecompute {
    /// The recomputed month
    pub month: YearMonth,
    /// Categories examined
    pub categories_processed: usize,
    /// Categories whose cached value changed beyond the write threshold
    pub categories_updated: usize,
}

/// Result of a chain walk: which months committed, which failed and stayed
/// flagged for retry.
#[derive(Debug, Default, Clone)]
pub struct ChainReport {
    /// Months recomputed and committed, in ascending order
    pub updated: Vec<YearMonth>,
    /// Months whose recomputation failed, with the error message
    pub failed: Vec<(YearMonth, String)>,
}

/// Rollover bookkeeping state of one budget month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverStatus {
    /// When the engine last committed values for the month
    pub last_calculated: Option<DateTime<Utc>>,
    /// Whether the cached values are stale
    pub needs_recalc: bool,
}

/// Computes the rollover carried into `month` for one category.
///
/// Pure read: looks up the previous month's budget and category budget
/// (absent → zero base case), derives the effective budget from the CACHED
/// previous rollover, and subtracts the source month's realized spend. The
/// cached value being current is the chain-ordering invariant's job, not
/// this function's. The carry is gated by the source month's
/// `rollover_enabled` flag.
pub async fn calculate_rollover<C>(
    db: &C,
    owner_id: i64,
    category_id: i64,
    month: YearMonth,
) -> Result<RolloverOutcome>
where
    C: ConnectionTrait,
{
    let source_month = month.prev();

    let Some(prev_budget) = find_budget(db, owner_id, source_month).await? else {
        return Ok(RolloverOutcome::base_case(source_month));
    };
    let Some(prev_limit) = find_category_budget(db, prev_budget.id, category_id).await? else {
        return Ok(RolloverOutcome::base_case(source_month));
    };

    if prev_limit.budget_amount < 0.0 {
        return Err(Error::Validation {
            message: format!(
                "Budget amount {} for category {category_id} in {source_month} is negative",
                prev_limit.budget_amount
            ),
        });
    }

    let effective_budget = prev_limit.budget_amount + prev_limit.rollover_amount;
    let spent_amount = spend::spend_for_month(db, owner_id, category_id, source_month).await?;
    let difference = effective_budget - spent_amount;

    let rollover_amount = if prev_limit.rollover_enabled {
        difference
    } else {
        0.0
    };

    Ok(RolloverOutcome {
        source_month,
        base_budget: prev_limit.budget_amount,
        prev_rollover: prev_limit.rollover_amount,
        effective_budget,
        spent_amount,
        rollover_amount,
    })
}

async fn record_calculation<C>(
    db: &C,
    budget_id: i64,
    category_id: i64,
    outcome: &RolloverOutcome,
    reason: RolloverReason,
) -> Result<()>
where
    C: ConnectionTrait,
{
    rollover_calculation::ActiveModel {
        budget_id: Set(budget_id),
        category_id: Set(category_id),
        calculated_at: Set(Utc::now()),
        rollover_amount: Set(outcome.rollover_amount),
        source_month: Set(outcome.source_month.to_string()),
        reason: Set(reason),
        base_budget: Set(outcome.base_budget),
        prev_rollover: Set(outcome.prev_rollover),
        effective_budget: Set(outcome.effective_budget),
        spent_amount: Set(outcome.spent_amount),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Recomputes every category of one budget month and commits the result as
/// one database transaction.
///
/// The `rollover_needs_recalc` flag is raised in its own commit first, so a
/// failure inside the month's transaction leaves the month marked stale. On
/// success the flag is cleared and `rollover_last_calculated` stamped in the
/// same transaction as the values. A [`rollover_calculation`] audit row is
/// appended for every category regardless of whether the cached value moved
/// more than [`ROLLOVER_WRITE_THRESHOLD`].
pub async fn recompute_budget(
    db: &DatabaseConnection,
    target: &budget::Model,
    month: YearMonth,
    reason: RolloverReason,
) -> Result<MonthRecompute> {
    // Committed independently of the month's transaction below.
    Budget::update_many()
        .col_expr(budget::Column::RolloverNeedsRecalc, Expr::value(true))
        .filter(budget::Column::Id.eq(target.id))
        .exec(db)
        .await?;

    let txn = db.begin().await?;

    let limits = CategoryBudget::find()
        .filter(category_budget::Column::BudgetId.eq(target.id))
        .all(&txn)
        .await?;

    let mut updated = 0;
    let processed = limits.len();

    for limit in limits {
        let outcome =
            calculate_rollover(&txn, target.owner_id, limit.category_id, month).await?;
        record_calculation(&txn, target.id, limit.category_id, &outcome, reason).await?;

        let delta = (outcome.rollover_amount - limit.rollover_amount).abs();
        if delta > ROLLOVER_WRITE_THRESHOLD {
            let mut active: category_budget::ActiveModel = limit.into();
            active.rollover_amount = Set(outcome.rollover_amount);
            active.update(&txn).await?;
            updated += 1;
        }
    }

    let mut active: budget::ActiveModel = target.clone().into();
    active.rollover_last_calculated = Set(Some(Utc::now()));
    active.rollover_needs_recalc = Set(false);
    active.update(&txn).await?;

    txn.commit().await?;

    debug!(
        "Recomputed rollover for {month}: {updated}/{processed} categories changed ({reason:?})"
    );

    Ok(MonthRecompute {
        month,
        categories_processed: processed,
        categories_updated: updated,
    })
}

/// Invalidates and recomputes every budget month after `changed_month`.
///
/// Months are processed strictly ascending — the order is load-bearing,
/// since each month reads the committed cache of the one before it. The
/// first recomputed month records the trigger's `reason`; the rest record
/// [`RolloverReason::ChainPropagation`]. A month that fails is logged,
/// rolled back, left flagged, and the walk continues; one event is
/// broadcast per month that commits.
pub async fn invalidate_and_recompute_chain(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    owner_id: i64,
    changed_month: YearMonth,
    reason: RolloverReason,
) -> Result<ChainReport> {
    // Zero-padded "YYYY-MM" makes the lexicographic comparison chronological.
    let budgets = Budget::find()
        .filter(budget::Column::OwnerId.eq(owner_id))
        .filter(budget::Column::IsActive.eq(true))
        .filter(budget::Column::YearMonth.gt(changed_month.to_string()))
        .order_by_asc(budget::Column::YearMonth)
        .all(db)
        .await?;

    let mut report = ChainReport::default();
    let mut step_reason = reason;

    for target in budgets {
        let month: YearMonth = target.year_month.parse()?;

        match recompute_budget(db, &target, month, step_reason).await {
            Ok(_) => {
                events
                    .broadcast(RolloverUpdate { owner_id, month })
                    .await;
                report.updated.push(month);
            }
            Err(e) => {
                warn!(
                    "Rollover recompute for party {owner_id} month {month} failed, \
                     leaving it flagged and continuing: {e}"
                );
                report.failed.push((month, e.to_string()));
            }
        }

        step_reason = RolloverReason::ChainPropagation;
    }

    if !report.updated.is_empty() || !report.failed.is_empty() {
        info!(
            "Rollover chain after {changed_month} for party {owner_id}: {} updated, {} failed",
            report.updated.len(),
            report.failed.len()
        );
    }

    Ok(report)
}

/// Manually recalculates one month and then propagates through the chain.
///
/// Unlike a chain step, a failure recomputing the requested month itself is
/// surfaced to the caller.
pub async fn recalculate_budget(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    owner_id: i64,
    month: YearMonth,
) -> Result<ChainReport> {
    let target = find_budget(db, owner_id, month).await?.ok_or_else(|| {
        Error::BudgetNotFound {
            year_month: month.to_string(),
        }
    })?;

    recompute_budget(db, &target, month, RolloverReason::ManualRecalculation).await?;
    events
        .broadcast(RolloverUpdate { owner_id, month })
        .await;

    let mut report = invalidate_and_recompute_chain(
        db,
        events,
        owner_id,
        month,
        RolloverReason::ChainPropagation,
    )
    .await?;
    report.updated.insert(0, month);
    Ok(report)
}

/// The rollover bookkeeping state of a budget month.
pub async fn get_rollover_status(
    db: &DatabaseConnection,
    owner_id: i64,
    month: YearMonth,
) -> Result<RolloverStatus> {
    let target = find_budget(db, owner_id, month).await?.ok_or_else(|| {
        Error::BudgetNotFound {
            year_month: month.to_string(),
        }
    })?;

    Ok(RolloverStatus {
        last_calculated: target.rollover_last_calculated,
        needs_recalc: target.rollover_needs_recalc,
    })
}

/// Audit history for a budget, optionally restricted to one category,
/// oldest first. Rows are append-only; there is no mutation path.
pub async fn rollover_history(
    db: &DatabaseConnection,
    budget_id: i64,
    category_id: Option<i64>,
) -> Result<Vec<rollover_calculation::Model>> {
    let mut query = rollover_calculation::Entity::find()
        .filter(rollover_calculation::Column::BudgetId.eq(budget_id));

    if let Some(category_id) = category_id {
        query = query.filter(rollover_calculation::Column::CategoryId.eq(category_id));
    }

    query
        .order_by_asc(rollover_calculation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    /// Scenario: Groceries, Jan budget $100 with rollover, $80 spent.
    /// February carries +$20.
    #[tokio::test]
    async fn test_leftover_carries_forward() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let jan = ym("2024-01");
        let feb = ym("2024-02");

        insert_budget(&fixture, jan, &[(fixture.groceries.id, 100.0, true)]).await?;
        let feb_budget =
            insert_budget(&fixture, feb, &[(fixture.groceries.id, 100.0, true)]).await?;

        // Recording the expense triggers the chain.
        record_expense(&fixture, fixture.groceries.id, 80.0, on_day(jan, 10)).await?;

        let limit = category_limit(fixture.db.as_ref(), feb_budget.id, fixture.groceries.id).await?;
        assert_eq!(limit.rollover_amount, 20.0);
        assert_eq!(limit.budget_amount + limit.rollover_amount, 120.0);

        let status = get_rollover_status(fixture.db.as_ref(), fixture.party.id, feb).await?;
        assert!(!status.needs_recalc);
        assert!(status.last_calculated.is_some());

        Ok(())
    }

    /// Scenario: Feb budget $100, $150 spent. March carries −$50.
    #[tokio::test]
    async fn test_overspend_is_deducted() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let feb = ym("2024-02");
        let mar = ym("2024-03");

        insert_budget(&fixture, feb, &[(fixture.groceries.id, 100.0, true)]).await?;
        let mar_budget =
            insert_budget(&fixture, mar, &[(fixture.groceries.id, 100.0, true)]).await?;

        record_expense(&fixture, fixture.groceries.id, 150.0, on_day(feb, 12)).await?;

        let limit = category_limit(fixture.db.as_ref(), mar_budget.id, fixture.groceries.id).await?;
        assert_eq!(limit.rollover_amount, -50.0);
        assert_eq!(limit.budget_amount + limit.rollover_amount, 50.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_no_prior_budget_is_zero_base_case() -> Result<()> {
        let fixture = setup_with_accounts().await?;

        let outcome = calculate_rollover(
            fixture.db.as_ref(),
            fixture.party.id,
            fixture.groceries.id,
            ym("2024-06"),
        )
        .await?;

        assert_eq!(outcome.rollover_amount, 0.0);
        assert_eq!(outcome.effective_budget, 0.0);
        assert_eq!(outcome.source_month, ym("2024-05"));

        Ok(())
    }

    #[tokio::test]
    async fn test_rollover_disabled_carries_nothing() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let jan = ym("2024-01");
        let feb = ym("2024-02");

        insert_budget(&fixture, jan, &[(fixture.groceries.id, 100.0, false)]).await?;
        let feb_budget =
            insert_budget(&fixture, feb, &[(fixture.groceries.id, 100.0, true)]).await?;

        record_expense(&fixture, fixture.groceries.id, 30.0, on_day(jan, 10)).await?;

        // $70 leftover, but the source month does not roll over.
        let limit = category_limit(fixture.db.as_ref(), feb_budget.id, fixture.groceries.id).await?;
        assert_eq!(limit.rollover_amount, 0.0);

        // The audit row still captures the difference that was not carried.
        let outcome = calculate_rollover(
            fixture.db.as_ref(),
            fixture.party.id,
            fixture.groceries.id,
            feb,
        )
        .await?;
        assert_eq!(outcome.effective_budget, 100.0);
        assert_eq!(outcome.spent_amount, 30.0);
        assert_eq!(outcome.rollover_amount, 0.0);

        Ok(())
    }

    /// Scenario: a forgotten January transaction lands after February and
    /// March were computed. The chain recomputes February first, then March
    /// from February's corrected value.
    #[tokio::test]
    async fn test_retroactive_edit_repropagates_in_order() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let jan = ym("2024-01");
        let feb = ym("2024-02");
        let mar = ym("2024-03");

        insert_budget(&fixture, jan, &[(fixture.groceries.id, 100.0, true)]).await?;
        let feb_budget =
            insert_budget(&fixture, feb, &[(fixture.groceries.id, 100.0, true)]).await?;
        let mar_budget =
            insert_budget(&fixture, mar, &[(fixture.groceries.id, 100.0, true)]).await?;

        record_expense(&fixture, fixture.groceries.id, 80.0, on_day(jan, 10)).await?;

        let feb_limit =
            category_limit(fixture.db.as_ref(), feb_budget.id, fixture.groceries.id).await?;
        assert_eq!(feb_limit.rollover_amount, 20.0);
        let mar_limit =
            category_limit(fixture.db.as_ref(), mar_budget.id, fixture.groceries.id).await?;
        assert_eq!(mar_limit.rollover_amount, 120.0);

        // The forgotten $30 grocery run.
        record_expense(&fixture, fixture.groceries.id, 30.0, on_day(jan, 28)).await?;

        let feb_limit =
            category_limit(fixture.db.as_ref(), feb_budget.id, fixture.groceries.id).await?;
        assert_eq!(feb_limit.rollover_amount, -10.0);
        let mar_limit =
            category_limit(fixture.db.as_ref(), mar_budget.id, fixture.groceries.id).await?;
        assert_eq!(mar_limit.rollover_amount, 90.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_chain_walks_ascending_and_is_idempotent() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let months = ["2024-01", "2024-02", "2024-03", "2024-04"];
        let mut budget_ids = Vec::new();
        for m in months {
            let b =
                insert_budget(&fixture, ym(m), &[(fixture.groceries.id, 100.0, true)]).await?;
            budget_ids.push(b.id);
        }

        record_expense(&fixture, fixture.groceries.id, 40.0, on_day(ym("2024-01"), 5))
            .await?;

        let report = invalidate_and_recompute_chain(
            fixture.db.as_ref(),
            &fixture.events,
            fixture.party.id,
            ym("2024-01"),
            RolloverReason::ManualRecalculation,
        )
        .await?;

        assert_eq!(
            report.updated,
            vec![ym("2024-02"), ym("2024-03"), ym("2024-04")]
        );
        assert!(report.failed.is_empty());

        let values_after_first: Vec<f64> = {
            let mut v = Vec::new();
            for id in &budget_ids[1..] {
                v.push(
                    category_limit(fixture.db.as_ref(), *id, fixture.groceries.id)
                        .await?
                        .rollover_amount,
                );
            }
            v
        };
        // 100−40 = 60 leftover in Jan, then compounding untouched months.
        assert_eq!(values_after_first, vec![60.0, 160.0, 260.0]);

        // A second identical walk converges to the same values.
        invalidate_and_recompute_chain(
            fixture.db.as_ref(),
            &fixture.events,
            fixture.party.id,
            ym("2024-01"),
            RolloverReason::ManualRecalculation,
        )
        .await?;

        for (id, expected) in budget_ids[1..].iter().zip(values_after_first) {
            let limit = category_limit(fixture.db.as_ref(), *id, fixture.groceries.id).await?;
            assert_eq!(limit.rollover_amount, expected);
        }

        Ok(())
    }

    /// One failing month stays flagged with its stale value while the walk
    /// continues past it.
    #[tokio::test]
    async fn test_failed_month_is_isolated() -> Result<()> {
        init_test_tracing();
        let fixture = setup_with_accounts().await?;
        let jan = ym("2024-01");
        let feb = ym("2024-02");
        let mar = ym("2024-03");
        let apr = ym("2024-04");

        insert_budget(&fixture, jan, &[(fixture.groceries.id, 100.0, true)]).await?;
        let feb_budget =
            insert_budget(&fixture, feb, &[(fixture.groceries.id, 100.0, true)]).await?;
        let mar_budget =
            insert_budget(&fixture, mar, &[(fixture.groceries.id, 100.0, true)]).await?;
        let apr_budget =
            insert_budget(&fixture, apr, &[(fixture.groceries.id, 100.0, true)]).await?;

        // Corrupt February's allocation behind the engine's back and give
        // March a recognizable stale value.
        set_budget_amount(fixture.db.as_ref(), feb_budget.id, fixture.groceries.id, -50.0).await?;
        set_rollover_amount(fixture.db.as_ref(), mar_budget.id, fixture.groceries.id, 7.77).await?;

        let report = invalidate_and_recompute_chain(
            fixture.db.as_ref(),
            &fixture.events,
            fixture.party.id,
            ym("2023-12"),
            RolloverReason::ManualRecalculation,
        )
        .await?;

        // March reads February's negative base and fails; April continues.
        assert_eq!(report.updated, vec![jan, feb, apr]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, mar);

        // March: flag still raised, stale value untouched.
        let mar_status = get_rollover_status(fixture.db.as_ref(), fixture.party.id, mar).await?;
        assert!(mar_status.needs_recalc);
        let mar_limit =
            category_limit(fixture.db.as_ref(), mar_budget.id, fixture.groceries.id).await?;
        assert_eq!(mar_limit.rollover_amount, 7.77);

        // April committed normally (from March's stale cache).
        let apr_status = get_rollover_status(fixture.db.as_ref(), fixture.party.id, apr).await?;
        assert!(!apr_status.needs_recalc);
        assert!(apr_status.last_calculated.is_some());
        let apr_limit =
            category_limit(fixture.db.as_ref(), apr_budget.id, fixture.groceries.id).await?;
        assert_eq!(apr_limit.rollover_amount, 100.0 + 7.77);

        Ok(())
    }

    #[tokio::test]
    async fn test_sub_threshold_delta_is_not_written() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let jan = ym("2024-01");
        let feb = ym("2024-02");

        insert_budget(&fixture, jan, &[(fixture.groceries.id, 100.0, true)]).await?;
        let feb_budget =
            insert_budget(&fixture, feb, &[(fixture.groceries.id, 100.0, true)]).await?;

        record_expense(&fixture, fixture.groceries.id, 80.0, on_day(jan, 10)).await?;

        // Nudge the cached value by less than a cent; a rerun must not
        // churn it back.
        set_rollover_amount(fixture.db.as_ref(), feb_budget.id, fixture.groceries.id, 20.005)
            .await?;

        invalidate_and_recompute_chain(
            fixture.db.as_ref(),
            &fixture.events,
            fixture.party.id,
            jan,
            RolloverReason::ManualRecalculation,
        )
        .await?;

        let limit = category_limit(fixture.db.as_ref(), feb_budget.id, fixture.groceries.id).await?;
        assert_eq!(limit.rollover_amount, 20.005);

        Ok(())
    }

    #[tokio::test]
    async fn test_audit_rows_are_appended_with_reasons() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let jan = ym("2024-01");
        let feb = ym("2024-02");
        let mar = ym("2024-03");

        insert_budget(&fixture, jan, &[(fixture.groceries.id, 100.0, true)]).await?;
        let feb_budget =
            insert_budget(&fixture, feb, &[(fixture.groceries.id, 100.0, true)]).await?;
        let mar_budget =
            insert_budget(&fixture, mar, &[(fixture.groceries.id, 100.0, true)]).await?;

        record_expense(&fixture, fixture.groceries.id, 80.0, on_day(jan, 10)).await?;

        recalculate_budget(fixture.db.as_ref(), &fixture.events, fixture.party.id, feb).await?;

        let feb_history =
            rollover_history(fixture.db.as_ref(), feb_budget.id, Some(fixture.groceries.id)).await?;
        // One row from the transaction trigger, one from the manual pass.
        assert_eq!(feb_history.len(), 2);
        assert_eq!(feb_history[0].reason, RolloverReason::TransactionEdit);
        assert_eq!(
            feb_history[1].reason,
            RolloverReason::ManualRecalculation
        );

        let latest = &feb_history[1];
        assert_eq!(latest.source_month, "2024-01");
        assert_eq!(latest.base_budget, 100.0);
        assert_eq!(latest.prev_rollover, 0.0);
        assert_eq!(latest.effective_budget, 100.0);
        assert_eq!(latest.spent_amount, 80.0);
        assert_eq!(latest.rollover_amount, 20.0);

        let mar_history = rollover_history(fixture.db.as_ref(), mar_budget.id, None).await?;
        assert!(
            mar_history
                .iter()
                .all(|row| row.reason == RolloverReason::ChainPropagation)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_chain_emits_one_event_per_committed_month() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let (_id, mut rx) = fixture.events.register().await;

        insert_budget(&fixture, ym("2024-01"), &[(fixture.groceries.id, 100.0, true)])
            .await?;
        insert_budget(&fixture, ym("2024-02"), &[(fixture.groceries.id, 100.0, true)])
            .await?;
        insert_budget(&fixture, ym("2024-03"), &[(fixture.groceries.id, 100.0, true)])
            .await?;

        invalidate_and_recompute_chain(
            fixture.db.as_ref(),
            &fixture.events,
            fixture.party.id,
            ym("2024-01"),
            RolloverReason::BudgetEdit,
        )
        .await?;

        let first = rx.recv().await.unwrap();
        assert_eq!(first.month, ym("2024-02"));
        assert_eq!(first.owner_id, fixture.party.id);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.month, ym("2024-03"));
        assert!(rx.try_recv().is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_recalculate_unknown_month_is_not_found() -> Result<()> {
        let fixture = setup_with_accounts().await?;

        let result =
            recalculate_budget(fixture.db.as_ref(), &fixture.events, fixture.party.id, ym("2030-01"))
                .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::BudgetNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_chain_ignores_other_owners() -> Result<()> {
        let fixture = setup_with_accounts().await?;
        let other = setup_party_with_accounts(&fixture.db, "Bob").await?;

        insert_budget(&fixture, ym("2024-02"), &[(fixture.groceries.id, 100.0, true)])
            .await?;
        let other_budget =
            insert_budget(&other, ym("2024-02"), &[(other.groceries.id, 100.0, true)])
                .await?;

        invalidate_and_recompute_chain(
            fixture.db.as_ref(),
            &fixture.events,
            fixture.party.id,
            ym("2024-01"),
            RolloverReason::ManualRecalculation,
        )
        .await?;

        // Bob's budget was never touched.
        let status =
            get_rollover_status(fixture.db.as_ref(), other.party.id, ym("2024-02")).await?;
        assert!(!status.needs_recalc);
        assert!(status.last_calculated.is_none());
        let limit =
            category_limit(fixture.db.as_ref(), other_budget.id, other.groceries.id).await?;
        assert_eq!(limit.rollover_amount, 0.0);

        Ok(())
    }
}
