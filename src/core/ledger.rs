//! Ledger journal - balanced double-entry recording.
//!
//! The journal is the only mutator of financial truth. A transaction is
//! accepted only with two or more entries whose signed amounts sum to zero
//! (within [`BALANCE_EPSILON`]), and is persisted with all its entries as a
//! single atomic unit; no partial state is ever visible. The journal never
//! generates offsetting entries itself — see [`crate::core::postings`] for
//! the builders that construct balanced sets.
//!
//! Every mutation dated in month M invalidates the rollover chain for the
//! months after M, because a past month's spend feeds the next month's
//! effective budget.

use crate::{
    core::{month::YearMonth, rollover},
    entities::{
        Account, Entry, LedgerTransaction, RolloverReason, account, entry, ledger_transaction,
    },
    errors::{Error, Result},
    notify::UpdateBroadcaster,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, error, instrument};

/// Tolerance for the zero-sum check on a transaction's entries.
pub const BALANCE_EPSILON: f64 = 1e-4;

/// One posting of a transaction being recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryDraft {
    /// Account the amount posts against
    pub account_id: i64,
    /// Signed amount (positive = debit, negative = credit)
    pub amount: f64,
    /// Whether the entry counts toward spend aggregation
    pub is_reportable: bool,
}

impl EntryDraft {
    /// A reportable posting.
    #[must_use]
    pub const fn new(account_id: i64, amount: f64) -> Self {
        Self {
            account_id,
            amount,
            is_reportable: true,
        }
    }

    /// Marks the posting as excluded from spend aggregation.
    #[must_use]
    pub const fn non_reportable(mut self) -> Self {
        self.is_reportable = false;
        self
    }
}

/// Input for recording or replacing a ledger transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Human-readable description
    pub description: String,
    /// When the economic event occurred (UTC)
    pub date: DateTime<Utc>,
    /// Optional free-form notes
    pub notes: Option<String>,
    /// Optional external reference
    pub external_id: Option<String>,
    /// The balanced postings, two or more
    pub entries: Vec<EntryDraft>,
}

fn validate_entries(entries: &[EntryDraft]) -> Result<()> {
    if entries.len() < 2 {
        return Err(Error::Validation {
            message: "A transaction requires at least two entries".to_string(),
        });
    }

    for draft in entries {
        if !draft.amount.is_finite() || draft.amount == 0.0 {
            return Err(Error::InvalidAmount {
                amount: draft.amount,
            });
        }
    }

    let total: f64 = entries.iter().map(|e| e.amount).sum();
    if total.abs() > BALANCE_EPSILON {
        return Err(Error::Unbalanced { total });
    }

    Ok(())
}

/// Every referenced account must exist, belong to the owner, and be active.
async fn verify_accounts<C>(db: &C, owner_id: i64, entries: &[EntryDraft]) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<i64> = entries.iter().map(|e| e.account_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let accounts = Account::find()
        .filter(account::Column::Id.is_in(ids.clone()))
        .filter(account::Column::OwnerId.eq(owner_id))
        .filter(account::Column::IsActive.eq(true))
        .all(db)
        .await?;

    if accounts.len() != ids.len() {
        let found: HashSet<i64> = accounts.iter().map(|a| a.id).collect();
        let missing = ids
            .into_iter()
            .find(|id| !found.contains(id))
            .unwrap_or_default();
        return Err(Error::AccountNotFound { id: missing });
    }

    Ok(())
}

async fn insert_entries<C>(db: &C, transaction_id: i64, entries: &[EntryDraft]) -> Result<()>
where
    C: ConnectionTrait,
{
    for draft in entries {
        entry::ActiveModel {
            transaction_id: Set(transaction_id),
            account_id: Set(draft.account_id),
            amount: Set(draft.amount),
            is_reportable: Set(draft.is_reportable),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Runs the rollover chain for a mutated month. The journal write has
/// already committed, so a chain failure here is logged rather than
/// surfaced; affected months stay flagged for a later recalculation.
async fn trigger_chain(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    owner_id: i64,
    changed_month: YearMonth,
) {
    let result = rollover::invalidate_and_recompute_chain(
        db,
        events,
        owner_id,
        changed_month,
        RolloverReason::TransactionEdit,
    )
    .await;

    if let Err(e) = result {
        error!(
            "Rollover chain after ledger mutation in {changed_month} for party \
             {owner_id} failed: {e}"
        );
    }
}

/// Records a balanced double-entry transaction.
///
/// Rejects with a validation error — persisting nothing — when there are
/// fewer than two entries, any amount is zero or non-finite, any referenced
/// account is missing/foreign/inactive, or the entries do not sum to zero
/// within [`BALANCE_EPSILON`]. Otherwise the transaction and all entries are
/// committed as one unit and are immediately visible to spend aggregation,
/// and the rollover chain for subsequent months is recomputed.
#[instrument(skip(db, events, new), fields(description = %new.description))]
pub async fn record_transaction(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    owner_id: i64,
    new: NewTransaction,
) -> Result<ledger_transaction::Model> {
    validate_entries(&new.entries)?;

    let txn = db.begin().await?;
    verify_accounts(&txn, owner_id, &new.entries).await?;

    let model = ledger_transaction::ActiveModel {
        owner_id: Set(owner_id),
        date: Set(new.date),
        description: Set(new.description.clone()),
        notes: Set(new.notes.clone()),
        external_id: Set(new.external_id.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    insert_entries(&txn, model.id, &new.entries).await?;
    txn.commit().await?;

    debug!(
        "Recorded transaction {} with {} entries",
        model.id,
        new.entries.len()
    );

    trigger_chain(db, events, owner_id, YearMonth::from_date(new.date)).await;
    Ok(model)
}

/// Replaces a transaction's fields and entry set atomically, then
/// invalidates the chain from the earlier of the old and new months.
pub async fn update_transaction(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    transaction_id: i64,
    changes: NewTransaction,
) -> Result<ledger_transaction::Model> {
    validate_entries(&changes.entries)?;

    let existing = LedgerTransaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    let owner_id = existing.owner_id;
    let old_month = YearMonth::from_date(existing.date);
    let new_month = YearMonth::from_date(changes.date);

    let txn = db.begin().await?;
    verify_accounts(&txn, owner_id, &changes.entries).await?;

    Entry::delete_many()
        .filter(entry::Column::TransactionId.eq(transaction_id))
        .exec(&txn)
        .await?;

    let mut active: ledger_transaction::ActiveModel = existing.into();
    active.date = Set(changes.date);
    active.description = Set(changes.description.clone());
    active.notes = Set(changes.notes.clone());
    active.external_id = Set(changes.external_id.clone());
    let model = active.update(&txn).await?;

    insert_entries(&txn, transaction_id, &changes.entries).await?;
    txn.commit().await?;

    debug!("Replaced entries of transaction {transaction_id}");

    trigger_chain(db, events, owner_id, old_month.min(new_month)).await;
    Ok(model)
}

/// Deletes a transaction and its entries atomically, then invalidates the
/// chain from its month.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    events: &UpdateBroadcaster,
    transaction_id: i64,
) -> Result<()> {
    let existing = LedgerTransaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    let owner_id = existing.owner_id;
    let month = YearMonth::from_date(existing.date);

    let txn = db.begin().await?;
    Entry::delete_many()
        .filter(entry::Column::TransactionId.eq(transaction_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    debug!("Deleted transaction {transaction_id}");

    trigger_chain(db, events, owner_id, month).await;
    Ok(())
}

/// Fetches a transaction by id.
pub async fn get_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<ledger_transaction::Model>> {
    LedgerTransaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The entries of one transaction.
pub async fn entries_for_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Vec<entry::Model>> {
    Entry::find()
        .filter(entry::Column::TransactionId.eq(transaction_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// An owner's transactions, newest first.
pub async fn transactions_for_owner(
    db: &DatabaseConnection,
    owner_id: i64,
    limit: u64,
) -> Result<Vec<ledger_transaction::Model>> {
    LedgerTransaction::find()
        .filter(ledger_transaction::Column::OwnerId.eq(owner_id))
        .order_by_desc(ledger_transaction::Column::Date)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
