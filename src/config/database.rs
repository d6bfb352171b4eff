//! Database configuration module.
//!
//! Handles `SQLite` connection setup and table creation using `SeaORM`.
//! Tables are generated from the entity definitions via
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without hand-written SQL.

use crate::entities::{
    Account, Budget, CategoryBudget, Entry, LedgerTransaction, Party, RolloverCalculation,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default
/// `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/finance_tracker.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`,
/// falling back to a local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let party_table = schema.create_table_from_entity(Party);
    let account_table = schema.create_table_from_entity(Account);
    let transaction_table = schema.create_table_from_entity(LedgerTransaction);
    let entry_table = schema.create_table_from_entity(Entry);
    let budget_table = schema.create_table_from_entity(Budget);
    let category_budget_table = schema.create_table_from_entity(CategoryBudget);
    let rollover_calculation_table = schema.create_table_from_entity(RolloverCalculation);

    db.execute(builder.build(&party_table)).await?;
    db.execute(builder.build(&account_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;
    db.execute(builder.build(&entry_table)).await?;
    db.execute(builder.build(&budget_table)).await?;
    db.execute(builder.build(&category_budget_table)).await?;
    db.execute(builder.build(&rollover_calculation_table)).await?;

    Ok(())
}
