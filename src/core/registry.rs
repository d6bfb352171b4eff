//! Account registry - parties and the chart of accounts.
//!
//! Owns account creation, lookup, and the category-as-account conversion.
//! Budget categories are EXPENSE accounts; [`expense_category`] is the one
//! place that conversion happens, so nothing else in the crate aliases the
//! two concepts implicitly.

use crate::{
    config::accounts::ChartConfig,
    entities::{Account, AccountKind, Party, account, party},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};

/// Default currency for accounts created without an explicit code.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Creates a new party (an economic actor owning accounts and budgets).
pub async fn create_party(db: &DatabaseConnection, name: &str) -> Result<party::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Party name cannot be empty".to_string(),
        });
    }

    let model = party::ActiveModel {
        name: Set(name.trim().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    debug!("Created party {} ({})", result.name, result.id);
    Ok(result)
}

/// Fetches a party by id.
pub async fn get_party(db: &DatabaseConnection, party_id: i64) -> Result<Option<party::Model>> {
    Party::find_by_id(party_id).one(db).await.map_err(Into::into)
}

/// Creates a new account in the owner's chart.
///
/// The owner must exist, and `parent_id`, when given, must name an account
/// of the same owner. The parent link is for lookup/display grouping only.
pub async fn create_account(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
    kind: AccountKind,
    parent_id: Option<i64>,
    currency: Option<String>,
) -> Result<account::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Account name cannot be empty".to_string(),
        });
    }

    Party::find_by_id(owner_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Validation {
            message: format!("No party with id {owner_id}"),
        })?;

    if let Some(parent) = parent_id {
        let parent_account = Account::find_by_id(parent)
            .one(db)
            .await?
            .ok_or(Error::AccountNotFound { id: parent })?;
        if parent_account.owner_id != owner_id {
            return Err(Error::Validation {
                message: format!("Parent account {parent} belongs to another party"),
            });
        }
    }

    let model = account::ActiveModel {
        owner_id: Set(owner_id),
        name: Set(name.trim().to_string()),
        kind: Set(kind),
        parent_id: Set(parent_id),
        is_active: Set(true),
        currency: Set(currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    debug!(
        "Created {:?} account {} ({}) for party {}",
        result.kind, result.name, result.id, owner_id
    );
    Ok(result)
}

/// Fetches an account by id, including inactive ones.
pub async fn get_account<C>(db: &C, account_id: i64) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active account of an owner by name.
pub async fn get_account_by_name(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
) -> Result<Option<account::Model>> {
    Account::find()
        .filter(account::Column::OwnerId.eq(owner_id))
        .filter(account::Column::Name.eq(name))
        .filter(account::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists an owner's active accounts, optionally restricted by kind,
/// ordered alphabetically.
pub async fn list_accounts(
    db: &DatabaseConnection,
    owner_id: i64,
    kind: Option<AccountKind>,
) -> Result<Vec<account::Model>> {
    let mut query = Account::find()
        .filter(account::Column::OwnerId.eq(owner_id))
        .filter(account::Column::IsActive.eq(true));

    if let Some(kind) = kind {
        query = query.filter(account::Column::Kind.eq(kind));
    }

    query
        .order_by_asc(account::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active account by name, creating it when missing.
pub async fn get_or_create_account(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
    kind: AccountKind,
) -> Result<account::Model> {
    match get_account_by_name(db, owner_id, name).await? {
        Some(existing) => Ok(existing),
        None => create_account(db, owner_id, name, kind, None, None).await,
    }
}

/// Soft-deactivates an account so it disappears from lookups. Historical
/// ledger entries against it stay intact.
pub async fn deactivate_account(db: &DatabaseConnection, account_id: i64) -> Result<()> {
    let account = Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    let mut active: account::ActiveModel = account.into();
    active.is_active = Set(false);
    active.update(db).await?;
    Ok(())
}

/// Resolves an account id to an active EXPENSE account owned by `owner_id`.
///
/// This is the single conversion point between "category" and "account":
/// every budget and rollover path resolves categories here instead of
/// aliasing the two concepts field-by-field.
pub async fn expense_category<C>(
    db: &C,
    owner_id: i64,
    account_id: i64,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let account = Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })?;

    if account.owner_id != owner_id || !account.is_active {
        return Err(Error::AccountNotFound { id: account_id });
    }

    if account.kind != AccountKind::Expense {
        return Err(Error::Validation {
            message: format!(
                "Account {} ({:?}) is not an expense category",
                account.name, account.kind
            ),
        });
    }

    Ok(account)
}

/// Seeds the default chart of accounts for a new party: the four root
/// accounts plus a small starter set.
pub async fn seed_default_accounts(db: &DatabaseConnection, owner_id: i64) -> Result<()> {
    create_account(db, owner_id, "Assets", AccountKind::Asset, None, None).await?;
    create_account(db, owner_id, "Liabilities", AccountKind::Liability, None, None).await?;
    create_account(db, owner_id, "Income", AccountKind::Income, None, None).await?;
    create_account(db, owner_id, "Expenses", AccountKind::Expense, None, None).await?;

    create_account(db, owner_id, "Cash", AccountKind::Asset, None, None).await?;
    create_account(db, owner_id, "Groceries", AccountKind::Expense, None, None).await?;
    create_account(db, owner_id, "Salary", AccountKind::Income, None, None).await?;

    info!("Seeded default chart of accounts for party {owner_id}");
    Ok(())
}

/// Seeds a party's chart from a TOML chart configuration. Parents are
/// resolved by name, so the file must list parents before children.
pub async fn seed_accounts(
    db: &DatabaseConnection,
    owner_id: i64,
    chart: &ChartConfig,
) -> Result<Vec<account::Model>> {
    let mut created = Vec::with_capacity(chart.accounts.len());

    for entry in &chart.accounts {
        let kind = entry.account_kind()?;

        let parent_id = match &entry.parent {
            Some(parent_name) => Some(
                get_account_by_name(db, owner_id, parent_name)
                    .await?
                    .ok_or_else(|| Error::Config {
                        message: format!(
                            "Chart lists parent {parent_name:?} before defining it"
                        ),
                    })?
                    .id,
            ),
            None => None,
        };

        created.push(
            create_account(db, owner_id, &entry.name, kind, parent_id, entry.currency.clone())
                .await?,
        );
    }

    info!(
        "Seeded {} accounts from chart for party {owner_id}",
        created.len()
    );
    Ok(created)
}
