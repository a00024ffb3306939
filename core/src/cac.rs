//! CAC / break-even overlay for the LTV matrix.
//!
//! CAC for a cohort = converted marketing spend for its acquisition month
//! divided by cohort size. Break-even = first offset whose converted
//! cumulative LTV meets or exceeds CAC.
//!
//! A missing spend entry means "no CAC", never zero spend. The absent
//! marker propagates to the break-even month.

use crate::{
    currency::CurrencyConfig,
    month::MonthKey,
    pivot::CohortPivotRow,
    types::Offset,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marketing spend per acquisition month, ledger currency.
pub type SpendTable = BTreeMap<MonthKey, f64>;

/// Per-customer acquisition cost in display currency.
pub fn cac(spend: Option<f64>, cohort_size: u32, currency: &CurrencyConfig) -> Option<f64> {
    let spend = spend.filter(|s| s.is_finite())?;
    if cohort_size == 0 {
        return None;
    }
    Some(currency.convert(spend) / cohort_size as f64)
}

/// Relative slack for the CAC comparison. `cac` and each cell are
/// converted along different float paths (spend × rate ÷ size against
/// value × rate), so an exact ledger-currency meet can land a few ulps
/// short after conversion.
const MEET_TOLERANCE: f64 = 16.0 * f64::EPSILON;

fn meets(value: f64, target: f64) -> bool {
    value >= target || target - value <= target.abs() * MEET_TOLERANCE
}

/// First offset in `0..=max_month` whose converted value is `>= cac`.
///
/// Absent cells are skipped, not read as zero. The scan does not assume
/// the series is monotonic. Meeting CAC exactly counts at any rate.
pub fn break_even(
    values: &BTreeMap<Offset, f64>,
    cac: Option<f64>,
    max_month: Offset,
    currency: &CurrencyConfig,
) -> Option<Offset> {
    let cac = cac?;
    values
        .range(..=max_month)
        .find(|(_, v)| meets(currency.convert(**v), cac))
        .map(|(m, _)| *m)
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CacOverlay {
    pub cac:              Option<f64>,
    pub break_even_month: Option<Offset>,
}

impl CacOverlay {
    pub fn for_row(
        row: &CohortPivotRow,
        spend: &SpendTable,
        currency: &CurrencyConfig,
        max_month: Offset,
    ) -> Self {
        let cac = cac(spend.get(&row.cohort_month).copied(), row.cohort_size, currency);
        let break_even_month = break_even(&row.values, cac, max_month, currency);
        Self { cac, break_even_month }
    }
}
