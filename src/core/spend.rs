//! Spend aggregation - realized spend per category over a date range.
//!
//! Read-only: sums the signed amounts of reportable ledger entries posted
//! against a category account. Positive entries (debits) are spending;
//! negative entries (refunds) reduce the total. All bounds are UTC instants,
//! matching the stored transaction dates, so no naive/aware normalization
//! can be missed at a call site.

use crate::{
    core::month::YearMonth,
    entities::{Entry, entry, ledger_transaction},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{JoinType, QuerySelect, prelude::*};

/// Sums reportable spend on `category_id` for transactions of `owner_id`
/// dated within `[start, end]` (both inclusive).
///
/// Returns 0.0 when nothing matches; an empty range is not an error.
pub async fn spend_between<C>(
    db: &C,
    owner_id: i64,
    category_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<f64>
where
    C: ConnectionTrait,
{
    let entries = Entry::find()
        .join(JoinType::InnerJoin, entry::Relation::Transaction.def())
        .filter(entry::Column::AccountId.eq(category_id))
        .filter(entry::Column::IsReportable.eq(true))
        .filter(ledger_transaction::Column::OwnerId.eq(owner_id))
        .filter(ledger_transaction::Column::Date.gte(start))
        .filter(ledger_transaction::Column::Date.lte(end))
        .all(db)
        .await?;

    Ok(entries.iter().map(|e| e.amount).sum())
}

/// Sums reportable spend on `category_id` for one calendar month.
pub async fn spend_for_month<C>(
    db: &C,
    owner_id: i64,
    category_id: i64,
    month: YearMonth,
) -> Result<f64>
where
    C: ConnectionTrait,
{
    let (start, end) = month.bounds();

    let entries = Entry::find()
        .join(JoinType::InnerJoin, entry::Relation::Transaction.def())
        .filter(entry::Column::AccountId.eq(category_id))
        .filter(entry::Column::IsReportable.eq(true))
        .filter(ledger_transaction::Column::OwnerId.eq(owner_id))
        .filter(ledger_transaction::Column::Date.gte(start))
        .filter(ledger_transaction::Column::Date.lt(end))
        .all(db)
        .await?;

    Ok(entries.iter().map(|e| e.amount).sum())
}
