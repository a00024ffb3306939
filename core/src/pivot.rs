//! Cohort pivot builder — cohort (row) × months-since-acquisition (column).
//!
//! Two specializations share one grouping pass:
//!   - retention: incomplete cohorts contribute their observed columns.
//!   - LTV: incomplete cohorts are dropped entirely, non-positive values
//!     are absent cells, and the largest recorded cell is reported for
//!     intensity scaling.
//!
//! RULES:
//!   - A row with no valid cohort key never creates a group.
//!   - No offset beyond `months_diff(cohort, boundary)` is ever recorded.
//!   - Absent and zero are distinct: cells are only ever inserted, never
//!     defaulted.

use crate::{
    fact::{CohortFact, LtvFact, RetentionFact},
    month::{add_months, month_key_from_date, months_diff, MonthKey},
    types::Offset,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Output types ─────────────────────────────────────────────────────────────

/// One cohort's row of the matrix. Built fresh per call, never mutated
/// after the builder hands it out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CohortPivotRow {
    pub cohort_month: MonthKey,
    pub cohort_size:  u32,
    pub values:       BTreeMap<Offset, f64>,
}

impl CohortPivotRow {
    pub fn value_at(&self, m: Offset) -> Option<f64> {
        self.values.get(&m).copied()
    }

    /// Dense slots `0..=max_month`; `None` means no data for that column.
    pub fn cells(&self, max_month: Offset) -> Vec<Option<f64>> {
        (0..=max_month).map(|m| self.value_at(m)).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetentionPivot {
    pub rows:      Vec<CohortPivotRow>,
    pub max_month: Offset,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LtvPivot {
    pub rows:      Vec<CohortPivotRow>,
    pub max_month: Offset,
    /// At least every recorded cell; zero when nothing was recorded.
    pub max_value: f64,
}

// ── Grouping ─────────────────────────────────────────────────────────────────

struct Grouper {
    boundary:  Option<MonthKey>,
    groups:    BTreeMap<MonthKey, CohortPivotRow>,
    max_month: Offset,
}

impl Grouper {
    fn new(boundary: Option<MonthKey>) -> Self {
        Self {
            boundary,
            groups: BTreeMap::new(),
            max_month: 0,
        }
    }

    /// Register the row's cohort group. Returns the group when the row's
    /// offset lies inside the observed window, `None` when it must be
    /// skipped.
    fn admit<F: CohortFact>(&mut self, row: &F) -> Option<&mut CohortPivotRow> {
        let key = row.cohort_month()?;

        let allowed = match self.boundary {
            Some(boundary) => {
                let allowed = months_diff(key, boundary);
                self.max_month = self.max_month.max(allowed);
                allowed
            }
            None => Offset::MAX,
        };

        // First row seen fixes the group's size.
        let group = self.groups.entry(key).or_insert_with(|| CohortPivotRow {
            cohort_month: key,
            cohort_size:  row.cohort_size(),
            values:       BTreeMap::new(),
        });
        if group.cohort_size != row.cohort_size() {
            log::warn!(
                "cohort {key}: size {} conflicts with {}, keeping first",
                row.cohort_size(),
                group.cohort_size
            );
        }

        if row.offset() > allowed {
            return None;
        }
        Some(group)
    }

    fn recorded(&mut self, m: Offset) {
        if self.boundary.is_none() {
            self.max_month = self.max_month.max(m);
        }
    }

    fn finish(self) -> (Vec<CohortPivotRow>, Offset) {
        (self.groups.into_values().collect(), self.max_month)
    }
}

// ── Builders ─────────────────────────────────────────────────────────────────

/// Build the retention matrix from already-filtered rows.
///
/// Later duplicates of the same (cohort, offset) overwrite earlier ones.
pub fn build_retention_pivot<'a>(
    rows: impl IntoIterator<Item = &'a RetentionFact>,
    last_observed: Option<MonthKey>,
) -> RetentionPivot {
    let mut grouper = Grouper::new(last_observed);

    for row in rows {
        let m = row.offset;
        if let Some(group) = grouper.admit(row) {
            group.values.insert(m, row.retention);
            grouper.recorded(m);
        }
    }

    let (rows, max_month) = grouper.finish();
    RetentionPivot { rows, max_month }
}

/// Build the LTV matrix from already-filtered rows.
pub fn build_ltv_pivot<'a>(
    rows: impl IntoIterator<Item = &'a LtvFact>,
    last_observed: Option<MonthKey>,
) -> LtvPivot {
    let mut grouper = Grouper::new(last_observed);
    let mut max_value = 0.0_f64;

    for row in rows {
        // A cohort needs one fully elapsed month before it has an LTV.
        if let (Some(key), Some(boundary)) = (row.cohort_month, last_observed) {
            if key >= boundary {
                continue;
            }
        }

        let m = row.offset;
        let value = row.ltv_per_user;
        if let Some(group) = grouper.admit(row) {
            if value > 0.0 {
                group.values.insert(m, value);
                max_value = max_value.max(value);
                grouper.recorded(m);
            }
        }
    }

    let (rows, max_month) = grouper.finish();
    LtvPivot { rows, max_month, max_value }
}

/// One month past the latest cohort that has an offset-0 fact, or `None`
/// when no such fact exists.
pub fn observation_boundary<'a, F: CohortFact + 'a>(
    facts: impl IntoIterator<Item = &'a F>,
) -> Option<MonthKey> {
    let latest = facts
        .into_iter()
        .filter(|f| f.offset() == 0)
        .filter_map(|f| f.cohort_month())
        .max()?;
    month_key_from_date(add_months(latest.first_day()?, 1)?)
}
