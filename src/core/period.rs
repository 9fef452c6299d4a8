//! Monthly target-period type.
//!
//! A `Month` identifies the calendar period an observation describes, as
//! opposed to when it was published. Panels are keyed by `Month` and release
//! horizon.

use crate::error::{Result, RevcastError};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// A calendar month, the target-period granularity of the release panels.
///
/// Internally stored as a month ordinal (`year * 12 + month0`), which makes
/// ordering and horizon arithmetic plain integer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(i32);

impl Month {
    /// Create a month from calendar components.
    ///
    /// # Errors
    /// `PeriodError` if `month` is not in `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        // chrono validates the calendar date for us
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| RevcastError::PeriodError(format!("invalid month {year}-{month:02}")))?;
        Ok(Self(year * 12 + month as i32 - 1))
    }

    /// Year component.
    pub fn year(&self) -> i32 {
        self.0.div_euclid(12)
    }

    /// Month component (1..=12).
    pub fn month(&self) -> u32 {
        (self.0.rem_euclid(12) + 1) as u32
    }

    /// The month `n` steps forward (negative `n` steps backward).
    pub fn offset(&self, n: i32) -> Self {
        Self(self.0 + n)
    }

    /// The next month.
    pub fn succ(&self) -> Self {
        self.offset(1)
    }

    /// The previous month.
    pub fn pred(&self) -> Self {
        self.offset(-1)
    }

    /// Signed number of months from `earlier` to `self`.
    pub fn months_since(&self, earlier: Month) -> i32 {
        self.0 - earlier.0
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
            .expect("month ordinal always maps to a valid date")
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self(date.year() * 12 + date.month0() as i32)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = RevcastError;

    /// Parse from `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| RevcastError::PeriodError(format!("expected YYYY-MM, got '{s}'")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| RevcastError::PeriodError(format!("bad year in '{s}'")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| RevcastError::PeriodError(format!("bad month in '{s}'")))?;
        Month::new(year, month)
    }
}

/// Generate the inclusive range of months `[start, end]`.
///
/// # Errors
/// `PeriodError` if `end < start`.
pub fn month_range(start: Month, end: Month) -> Result<Vec<Month>> {
    if end < start {
        return Err(RevcastError::PeriodError(format!(
            "range end {end} precedes start {start}"
        )));
    }
    let n = end.months_since(start) + 1;
    Ok((0..n).map(|i| start.offset(i)).collect())
}
