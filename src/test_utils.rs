//! Shared test utilities.
//!
//! Provides an in-memory database, a standard fixture (one party with a
//! small chart of accounts), and helpers for recording ledger activity and
//! seeding budgets directly — the direct seeding bypasses the budget store
//! so engine tests control exactly what the rollover chain sees.

use crate::{
    config,
    core::{
        ledger::{self, EntryDraft, NewTransaction},
        month::YearMonth,
        postings, registry,
    },
    entities::{AccountKind, account, budget, category_budget, ledger_transaction, party},
    errors::{Error, Result},
    notify::UpdateBroadcaster,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initializes tracing for tests, honoring `RUST_LOG`. Safe to call from
/// every test; only the first call wins.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// A party with a ready-to-use chart of accounts on a shared database.
pub struct Fixture {
    /// Database handle (cheap to clone, shared between fixtures)
    pub db: Arc<DatabaseConnection>,
    /// Event broadcaster wired into ledger/budget mutations
    pub events: UpdateBroadcaster,
    /// The owning party
    pub party: party::Model,
    /// An ASSET source account
    pub cash: account::Model,
    /// An EXPENSE category
    pub groceries: account::Model,
    /// A second EXPENSE category
    pub dining: account::Model,
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a fresh database plus the standard fixture party "Alice".
pub async fn setup_with_accounts() -> Result<Fixture> {
    let db = Arc::new(setup_test_db().await?);
    setup_party_with_accounts(&db, "Alice").await
}

/// Adds another party with its own chart to an existing database.
pub async fn setup_party_with_accounts(
    db: &Arc<DatabaseConnection>,
    name: &str,
) -> Result<Fixture> {
    let party = registry::create_party(db, name).await?;
    let cash =
        registry::create_account(db, party.id, "Cash", AccountKind::Asset, None, None).await?;
    let groceries =
        registry::create_account(db, party.id, "Groceries", AccountKind::Expense, None, None)
            .await?;
    let dining =
        registry::create_account(db, party.id, "Dining", AccountKind::Expense, None, None)
            .await?;

    Ok(Fixture {
        db: db.clone(),
        events: UpdateBroadcaster::new(),
        party,
        cash,
        groceries,
        dining,
    })
}

/// Parses a `"YYYY-MM"` literal. Panics on malformed input, which in a test
/// is the right failure mode.
#[must_use]
pub fn ym(s: &str) -> YearMonth {
    s.parse().unwrap_or_else(|_| panic!("bad test month {s:?}"))
}

/// Noon UTC on the given day of a month.
#[must_use]
pub fn on_day(month: YearMonth, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(month.year(), month.month(), day, 12, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("bad test date {month}-{day:02}"))
}

/// Records a plain expense from the fixture's cash account.
pub async fn record_expense(
    fixture: &Fixture,
    category_id: i64,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<ledger_transaction::Model> {
    let entries = postings::expense(fixture.cash.id, category_id, amount)?;
    ledger::record_transaction(
        fixture.db.as_ref(),
        &fixture.events,
        fixture.party.id,
        NewTransaction {
            description: "Test expense".to_string(),
            date,
            notes: None,
            external_id: None,
            entries,
        },
    )
    .await
}

/// Records a refund: the mirror image of an expense, reducing spend.
pub async fn record_refund(
    fixture: &Fixture,
    category_id: i64,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<ledger_transaction::Model> {
    let entries = vec![
        EntryDraft::new(fixture.cash.id, amount),
        EntryDraft::new(category_id, -amount),
    ];
    ledger::record_transaction(
        fixture.db.as_ref(),
        &fixture.events,
        fixture.party.id,
        NewTransaction {
            description: "Test refund".to_string(),
            date,
            notes: None,
            external_id: None,
            entries,
        },
    )
    .await
}

/// Records a transfer between two accounts (non-reportable legs).
pub async fn record_transfer(
    fixture: &Fixture,
    from_id: i64,
    to_id: i64,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<ledger_transaction::Model> {
    let entries = postings::transfer(from_id, to_id, amount)?;
    ledger::record_transaction(
        fixture.db.as_ref(),
        &fixture.events,
        fixture.party.id,
        NewTransaction {
            description: "Test transfer".to_string(),
            date,
            notes: None,
            external_id: None,
            entries,
        },
    )
    .await
}

/// Inserts a budget month directly, bypassing the budget store and the
/// rollover engine. `limits` is `(category_id, budget_amount,
/// rollover_enabled)`; cached rollover amounts start at zero.
pub async fn insert_budget(
    fixture: &Fixture,
    month: YearMonth,
    limits: &[(i64, f64, bool)],
) -> Result<budget::Model> {
    let model = budget::ActiveModel {
        owner_id: Set(fixture.party.id),
        year_month: Set(month.to_string()),
        is_active: Set(true),
        rollover_last_calculated: Set(None),
        rollover_needs_recalc: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(fixture.db.as_ref())
    .await?;

    for &(category_id, budget_amount, rollover_enabled) in limits {
        category_budget::ActiveModel {
            budget_id: Set(model.id),
            category_id: Set(category_id),
            budget_amount: Set(budget_amount),
            rollover_enabled: Set(rollover_enabled),
            rollover_amount: Set(0.0),
            ..Default::default()
        }
        .insert(fixture.db.as_ref())
        .await?;
    }

    Ok(model)
}

/// Fetches one category's limit row, failing the test if it is missing.
pub async fn category_limit(
    db: &DatabaseConnection,
    budget_id: i64,
    category_id: i64,
) -> Result<category_budget::Model> {
    crate::core::budget::find_category_budget(db, budget_id, category_id)
        .await?
        .ok_or_else(|| Error::Validation {
            message: format!("no limit for category {category_id} in budget {budget_id}"),
        })
}

/// Overwrites a cached rollover amount behind the engine's back.
pub async fn set_rollover_amount(
    db: &DatabaseConnection,
    budget_id: i64,
    category_id: i64,
    amount: f64,
) -> Result<()> {
    let limit = category_limit(db, budget_id, category_id).await?;
    let mut active: category_budget::ActiveModel = limit.into();
    active.rollover_amount = Set(amount);
    active.update(db).await?;
    Ok(())
}

/// Overwrites a base allocation directly, skipping store validation.
pub async fn set_budget_amount(
    db: &DatabaseConnection,
    budget_id: i64,
    category_id: i64,
    amount: f64,
) -> Result<()> {
    let limit = category_limit(db, budget_id, category_id).await?;
    let mut active: category_budget::ActiveModel = limit.into();
    active.budget_amount = Set(amount);
    active.update(db).await?;
    Ok(())
}
