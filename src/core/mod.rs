//! Core business logic - framework-agnostic ledger, budget, and rollover
//! operations. Everything here works against a `DatabaseConnection` and
//! returns structured data for an embedding service to present.

/// Monthly budgets and per-category limits
pub mod budget;
/// Balanced double-entry recording
pub mod ledger;
/// The `YearMonth` period type
pub mod month;
/// Builders for balanced posting sets
pub mod postings;
/// Parties and the chart of accounts
pub mod registry;
/// Month-to-month rollover propagation
pub mod rollover;
/// Realized spend aggregation
pub mod spend;
