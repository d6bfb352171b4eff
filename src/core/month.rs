//! Calendar month handling for budgets and the rollover chain.
//!
//! Budget periods are stored as zero-padded `"YYYY-MM"` strings, so their
//! lexicographic order is their chronological order. [`YearMonth`] owns that
//! format: parsing and validation, previous/next month with year wraparound,
//! and the UTC bounds used by the spend aggregator. All date comparisons in
//! the crate happen in UTC; query bounds derived here are `DateTime<Utc>`,
//! never naive datetimes.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// A calendar month, the unit of budgeting and rollover propagation.
///
/// Ordering is chronological and agrees with the lexicographic order of the
/// zero-padded string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month from its components, validating the month number.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth {
                value: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    /// The month a UTC instant falls in.
    #[must_use]
    pub fn from_date(date: DateTime<Utc>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month, 1-12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The preceding month, wrapping the year at January.
    #[must_use]
    pub const fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The following month, wrapping the year at December.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    fn first_day(&self) -> NaiveDate {
        // Month is validated at construction; the first of the month exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated year-month")
    }

    /// Midnight UTC on the first of the month.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.first_day().and_hms_opt(0, 0, 0).expect("midnight exists"))
    }

    /// UTC bounds of the month: start inclusive, next month's start exclusive.
    #[must_use]
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start(), self.next().start())
    }

    /// Whether a UTC instant falls within this month.
    #[must_use]
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds();
        date >= start && date < end
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMonth {
            value: s.to_string(),
        };

        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        if !bytes[..4].iter().all(u8::is_ascii_digit)
            || !bytes[5..].iter().all(u8::is_ascii_digit)
        {
            return Err(invalid());
        }

        let year: i32 = s[..4].parse().map_err(|_| invalid())?;
        let month: u32 = s[5..].parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}
