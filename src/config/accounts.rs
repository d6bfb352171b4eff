//! Chart-of-accounts configuration loading from TOML.
//!
//! A chart file lists the accounts to seed for a new party. Parent links are
//! expressed by name and resolved during seeding, so the file order must
//! list parents before children.

use crate::entities::AccountKind;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing an entire chart file
#[derive(Debug, Deserialize)]
pub struct ChartConfig {
    /// List of accounts to seed
    pub accounts: Vec<AccountConfig>,
}

/// Configuration for a single account
#[derive(Debug, Deserialize, Clone)]
pub struct AccountConfig {
    /// Name of the account
    pub name: String,
    /// Double-entry kind: `"ASSET"`, `"LIABILITY"`, `"INCOME"`, or `"EXPENSE"`
    pub kind: String,
    /// Optional parent account name, for display grouping
    pub parent: Option<String>,
    /// Optional ISO 4217 currency code; defaults to `"USD"`
    pub currency: Option<String>,
}

impl AccountConfig {
    /// Resolves the string `kind` field to an [`AccountKind`].
    pub fn account_kind(&self) -> Result<AccountKind> {
        match self.kind.as_str() {
            "ASSET" => Ok(AccountKind::Asset),
            "LIABILITY" => Ok(AccountKind::Liability),
            "INCOME" => Ok(AccountKind::Income),
            "EXPENSE" => Ok(AccountKind::Expense),
            other => Err(Error::Config {
                message: format!("Unknown account kind {other:?} for {:?}", self.name),
            }),
        }
    }
}

/// Loads a chart of accounts from a TOML file.
pub fn load_chart<P: AsRef<Path>>(path: P) -> Result<ChartConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read chart file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse chart file: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_chart_config() {
        let toml_str = r#"
            [[accounts]]
            name = "Assets"
            kind = "ASSET"

            [[accounts]]
            name = "Checking"
            kind = "ASSET"
            parent = "Assets"
            currency = "EUR"

            [[accounts]]
            name = "Groceries"
            kind = "EXPENSE"
        "#;

        let chart: ChartConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(chart.accounts.len(), 3);
        assert_eq!(chart.accounts[0].name, "Assets");
        assert_eq!(chart.accounts[0].account_kind().unwrap(), AccountKind::Asset);
        assert!(chart.accounts[0].parent.is_none());

        assert_eq!(chart.accounts[1].parent.as_deref(), Some("Assets"));
        assert_eq!(chart.accounts[1].currency.as_deref(), Some("EUR"));

        assert_eq!(
            chart.accounts[2].account_kind().unwrap(),
            AccountKind::Expense
        );
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let config = AccountConfig {
            name: "Weird".to_string(),
            kind: "EQUITY".to_string(),
            parent: None,
            currency: None,
        };
        assert!(matches!(
            config.account_kind().unwrap_err(),
            Error::Config { .. }
        ));
    }
}
