//! Posting builders - balanced entry sets for common transaction shapes.
//!
//! The ledger journal never generates offsetting entries itself; callers
//! supply fully balanced postings. These builders construct them for the
//! standard shapes: plain expenses, transfers, splits, and shared
//! (partially reimbursable) expenses. Every builder returns a set that sums
//! to zero by construction.
//!
//! Sign convention: positive = debit, negative = credit. An expense credits
//! the paying account and debits the category; paying by credit card works
//! identically because a liability grows on the credit side.

use crate::core::ledger::EntryDraft;
use crate::errors::{Error, Result};

/// How a shared expense's personal portion is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShareMethod {
    /// The personal portion is a fixed amount
    Fixed(f64),
    /// The personal portion is a percentage of the total
    Percentage(f64),
    /// The total is split equally between `n` people and one share is personal
    Equal(u32),
}

fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn positive_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// A plain expense: credit the source account, debit the category.
pub fn expense(source_id: i64, category_id: i64, amount: f64) -> Result<Vec<EntryDraft>> {
    let amount = positive_amount(amount)?;
    Ok(vec![
        EntryDraft::new(source_id, -amount),
        EntryDraft::new(category_id, amount),
    ])
}

/// A movement between two of the owner's accounts. Neither leg is
/// reportable; transfers are not spending.
pub fn transfer(source_id: i64, destination_id: i64, amount: f64) -> Result<Vec<EntryDraft>> {
    let amount = positive_amount(amount)?;
    Ok(vec![
        EntryDraft::new(source_id, -amount).non_reportable(),
        EntryDraft::new(destination_id, amount).non_reportable(),
    ])
}

/// An expense split across several categories, paid from one source.
pub fn split(source_id: i64, parts: &[(i64, f64)]) -> Result<Vec<EntryDraft>> {
    if parts.is_empty() {
        return Err(Error::Validation {
            message: "Split requires at least one part".to_string(),
        });
    }

    let mut entries = Vec::with_capacity(parts.len() + 1);
    let mut total = 0.0;
    for &(category_id, amount) in parts {
        let amount = positive_amount(amount)?;
        total += amount;
        entries.push(EntryDraft::new(category_id, amount));
    }
    entries.insert(0, EntryDraft::new(source_id, -total));
    Ok(entries)
}

/// Computes the personal portion of a shared expense.
///
/// Mirrors the share methods of expense splitting with housemates: a fixed
/// personal amount, a percentage of the total, or an equal n-way split. The
/// result is rounded to cents and must land in `[0, total]` (with a one-cent
/// tolerance before rounding).
pub fn personal_share(method: ShareMethod, total: f64) -> Result<f64> {
    let total = positive_amount(total)?;

    let personal = match method {
        ShareMethod::Fixed(value) => value,
        ShareMethod::Percentage(value) => total * (value / 100.0),
        ShareMethod::Equal(people) => {
            let people = if people == 0 { 1 } else { people };
            total / f64::from(people)
        }
    };

    if !personal.is_finite() || personal < 0.0 || personal > total + 0.01 {
        return Err(Error::Validation {
            message: format!("Personal amount {personal} invalid for total {total}"),
        });
    }

    Ok(round2(personal))
}

/// A shared, partially reimbursable expense: the personal portion debits the
/// category, the rest debits the reimbursable asset account (not counted as
/// spend), and the source is credited for the full amount.
pub fn shared_expense(
    source_id: i64,
    category_id: i64,
    reimbursable_id: i64,
    total: f64,
    personal: f64,
) -> Result<Vec<EntryDraft>> {
    let total = positive_amount(total)?;
    if !personal.is_finite() || personal < 0.0 || personal > total {
        return Err(Error::Validation {
            message: format!("Personal amount {personal} invalid for total {total}"),
        });
    }

    let personal = round2(personal);
    let reimbursable = round2(total - personal);

    let mut entries = vec![EntryDraft::new(source_id, -total)];
    if personal > 0.0 {
        entries.push(EntryDraft::new(category_id, personal));
    }
    if reimbursable > 0.0 {
        entries.push(EntryDraft::new(reimbursable_id, reimbursable).non_reportable());
    }
    Ok(entries)
}
