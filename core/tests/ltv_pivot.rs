//! LTV pivot builder tests.

use cohort_core::{
    fact::{Dimension, LtvFact, Measure, Metric, RetentionFact, Segment},
    month::{to_cohort_key, MonthKey},
    pivot::{build_ltv_pivot, build_retention_pivot},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn key(raw: &str) -> MonthKey {
    to_cohort_key(raw).unwrap()
}

fn ltv(cohort: &str, m: u32, value: f64) -> LtvFact {
    LtvFact {
        cohort_month: to_cohort_key(cohort),
        dimension: Dimension::Overall,
        dimension_value: "ALL".into(),
        offset: m,
        metric: Metric::Any,
        segment: Segment::All,
        measure: Measure::GrossMargin,
        cohort_size: 20,
        ltv_per_user: value,
    }
}

fn retention(cohort: &str, m: u32) -> RetentionFact {
    RetentionFact {
        cohort_month: to_cohort_key(cohort),
        dimension: Dimension::Overall,
        dimension_value: "ALL".into(),
        offset: m,
        metric: Metric::Any,
        segment: Segment::All,
        cohort_size: 20,
        retention: 1.0,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn empty_input_yields_empty_pivot() {
    let facts: Vec<LtvFact> = Vec::new();
    let pivot = build_ltv_pivot(&facts, Some(key("2025-03")));
    assert!(pivot.rows.is_empty());
    assert_eq!(pivot.max_month, 0);
    assert_eq!(pivot.max_value, 0.0);
}

/// An LTV cohort equal to the boundary is dropped, while the same month
/// still appears in the retention pivot.
#[test]
fn cohort_at_boundary_is_excluded() {
    let boundary = key("2025-03");

    let ltv_facts = vec![ltv("2025-02", 0, 120.0), ltv("2025-03", 0, 90.0)];
    let ltv_pivot = build_ltv_pivot(&ltv_facts, Some(boundary));
    let ltv_months: Vec<String> = ltv_pivot.rows.iter().map(|r| r.cohort_month.to_string()).collect();
    assert_eq!(ltv_months, vec!["2025-02"]);

    let ret_facts = vec![retention("2025-02", 0), retention("2025-03", 0)];
    let ret_pivot = build_retention_pivot(&ret_facts, Some(boundary));
    let ret_months: Vec<String> = ret_pivot.rows.iter().map(|r| r.cohort_month.to_string()).collect();
    assert_eq!(ret_months, vec!["2025-02", "2025-03"]);
}

/// Cohorts after the boundary are excluded too.
#[test]
fn cohort_after_boundary_is_excluded() {
    let facts = vec![ltv("2025-06", 0, 50.0)];
    let pivot = build_ltv_pivot(&facts, Some(key("2025-03")));
    assert!(pivot.rows.is_empty());
    assert_eq!(pivot.max_month, 0);
}

/// Non-positive values are absent cells, not zeros.
#[test]
fn non_positive_values_are_absent() {
    let facts = vec![ltv("2025-01", 0, 0.0), ltv("2025-01", 1, -4.0), ltv("2025-01", 2, 75.0)];
    let pivot = build_ltv_pivot(&facts, Some(key("2025-04")));

    let row = &pivot.rows[0];
    assert_eq!(row.value_at(0), None);
    assert_eq!(row.value_at(1), None);
    assert_eq!(row.value_at(2), Some(75.0));
    assert_eq!(row.cells(pivot.max_month), vec![None, None, Some(75.0), None]);
}

/// max_value is at least every recorded cell.
#[test]
fn max_value_tracks_largest_cell() {
    let facts = vec![
        ltv("2025-01", 0, 100.0),
        ltv("2025-01", 1, 250.0),
        ltv("2025-01", 2, 400.0),
        ltv("2025-02", 0, 130.0),
        ltv("2025-02", 1, 260.0),
    ];
    let pivot = build_ltv_pivot(&facts, Some(key("2025-04")));

    assert_eq!(pivot.max_value, 400.0);
    for row in &pivot.rows {
        for v in row.values.values() {
            assert!(pivot.max_value >= *v);
        }
    }
}

/// Truncated cells do not count towards max_value.
#[test]
fn truncated_cells_do_not_raise_max_value() {
    let facts = vec![ltv("2025-01", 0, 100.0), ltv("2025-01", 1, 200.0), ltv("2025-01", 5, 900.0)];
    let pivot = build_ltv_pivot(&facts, Some(key("2025-02")));

    assert_eq!(pivot.max_month, 1);
    assert_eq!(pivot.rows[0].value_at(5), None);
    assert_eq!(pivot.max_value, 200.0);
}

/// Without a boundary nothing is excluded and max_month follows the data.
#[test]
fn no_boundary_keeps_every_cohort() {
    let facts = vec![ltv("2025-01", 0, 10.0), ltv("2025-01", 3, 40.0), ltv("2025-09", 0, 12.0)];
    let pivot = build_ltv_pivot(&facts, None);
    assert_eq!(pivot.rows.len(), 2);
    assert_eq!(pivot.max_month, 3);
}

/// A cohort whose every cell is non-positive still gets a row of absent
/// cells, so it renders as "no data".
#[test]
fn all_absent_cohort_still_has_a_row() {
    let facts = vec![ltv("2025-01", 0, 0.0)];
    let pivot = build_ltv_pivot(&facts, Some(key("2025-02")));
    assert_eq!(pivot.rows.len(), 1);
    assert!(pivot.rows[0].values.is_empty());
    assert_eq!(pivot.max_value, 0.0);
}
