//! Month keys and calendar arithmetic.
//!
//! RULE: Every cohort is identified by a canonical zero-padded "YYYY-MM"
//! key. All offset math in the core goes through this module; nothing
//! else subtracts years or months by hand.

use crate::{error::CohortError, types::Offset};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated calendar month. Ordering matches the lexicographic order
/// of the "YYYY-MM" rendering because the year is bounded to four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year:  i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (0..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32   { self.year }
    pub fn month(&self) -> u32  { self.month }

    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
        let month = ordinal.rem_euclid(12) as u32 + 1;
        Self::new(year, month)
    }

    /// Shift by `n` calendar months (negative moves backwards).
    pub fn add_months(self, n: i32) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + n as i64)
    }

    /// Calendar date of the 1st, for date-based month stepping.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = CohortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_cohort_key(s).ok_or_else(|| CohortError::InvalidMonthKey { raw: s.to_string() })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ── Key derivation ─────────────────────────────────────────────────

/// Truncate a raw date-like string to its cohort month.
///
/// Anything after the first space is treated as a time component and
/// discarded. "2025-01-17 08:30:00", "2025-01-01" and "2025-01" all
/// yield `2025-01`. Returns `None` when the year or month is not a
/// number or the month is out of range; never panics.
pub fn to_cohort_key(raw: &str) -> Option<MonthKey> {
    let date_part = raw.trim().split(' ').next().unwrap_or_default();
    let mut parts = date_part.split('-');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    MonthKey::new(year, month)
}

pub fn month_key_from_date(date: NaiveDate) -> Option<MonthKey> {
    MonthKey::new(date.year(), date.month())
}

// ── Offset arithmetic ──────────────────────────────────────────────

/// Whole calendar months from `start` to `end`, clamped at zero.
/// A row observed ahead of the window contributes no offset.
pub fn months_diff(start: MonthKey, end: MonthKey) -> Offset {
    let diff = end.ordinal() - start.ordinal();
    u32::try_from(diff.max(0)).unwrap_or(u32::MAX)
}

/// `months_diff` over raw strings. Any unparseable key yields zero.
pub fn months_diff_raw(start: &str, end: &str) -> Offset {
    match (to_cohort_key(start), to_cohort_key(end)) {
        (Some(s), Some(e)) => months_diff(s, e),
        _ => 0,
    }
}

/// Add `n` calendar months to `date`, landing on the first of the
/// resulting month so short months never overflow.
pub fn add_months(date: NaiveDate, n: i32) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    if n >= 0 {
        first.checked_add_months(Months::new(n as u32))
    } else {
        first.checked_sub_months(Months::new(n.unsigned_abs()))
    }
}
