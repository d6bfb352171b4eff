//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants fall
//! into four groups — validation, not-found, database, and configuration —
//! which [`Error::kind`] exposes so that an embedding service can map them
//! onto its own status codes without matching on individual variants.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The entries of a ledger transaction do not sum to zero.
    #[error("transaction not balanced: entries sum to {total}")]
    Unbalanced {
        /// Signed sum of the rejected entry amounts
        total: f64,
    },

    /// An amount was zero, NaN, infinite, or otherwise unusable.
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// A month string did not match the zero-padded `YYYY-MM` format.
    #[error("invalid month string: {value:?}")]
    InvalidMonth {
        /// The string that failed to parse
        value: String,
    },

    /// Generic input validation failure (empty name, duplicate budget, ...).
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable description of the rejected input
        message: String,
    },

    /// No account with the given id (or not visible to the caller).
    #[error("account {id} not found")]
    AccountNotFound {
        /// Account primary key
        id: i64,
    },

    /// No active budget for the given month.
    #[error("no budget for {year_month}")]
    BudgetNotFound {
        /// The `YYYY-MM` period that was requested
        year_month: String,
    },

    /// The month has a budget, but not for the requested category.
    #[error("category {category_id} has no budget in {year_month}")]
    CategoryBudgetNotFound {
        /// The `YYYY-MM` period that was requested
        year_month: String,
        /// Category account id
        category_id: i64,
    },

    /// No ledger transaction with the given id.
    #[error("ledger transaction {id} not found")]
    TransactionNotFound {
        /// Transaction primary key
        id: i64,
    },

    /// Configuration error (unreadable config file, bad TOML, ...).
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration failure
        message: String,
    },

    /// Persistence-layer failure. Retryable by the caller.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Coarse error classification for collaborator layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any write; recoverable by correcting the input.
    Validation,
    /// The referenced entity does not exist (404-equivalent).
    NotFound,
    /// Persistence-layer I/O failure; retryable.
    Database,
    /// Configuration problem; not request-recoverable.
    Config,
}

impl Error {
    /// Returns the taxonomy group this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unbalanced { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidMonth { .. }
            | Self::Validation { .. } => ErrorKind::Validation,
            Self::AccountNotFound { .. }
            | Self::BudgetNotFound { .. }
            | Self::CategoryBudgetNotFound { .. }
            | Self::TransactionNotFound { .. } => ErrorKind::NotFound,
            Self::Database(_) => ErrorKind::Database,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

/// Convenience `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
