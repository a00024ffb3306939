//! Fact loading tests against the upstream CSV layouts.

use cohort_core::{
    fact::{Dimension, Measure, Metric, Segment},
    loader::{load_retention_csv, read_ltv, read_retention, LoadReport},
    month::to_cohort_key,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

const RETENTION_CSV: &str = "\
cohort_month,dimension,first_value,m,metric,cohort_size,retention
2025-01-01,overall,ALL,0,any,10,100.00%
2025-01-01,overall,ALL,1,any,10,70.00%
2025-01-01,category,pom hl,0,same,4,1.0
2025-01-01 00:00:00,category,pom hl,1,same,4,0.25
";

const LTV_CSV: &str = "\
cohort_type,cohort_month,dimension,first_value,m,metric,measure,cohort_size,ltv_per_user
purchase,2025-01-01,overall,ALL,0,any,gross_margin,10,120.5
purchase,2025-01-01,overall,ALL,1,any,gross_margin,10,\"1,210.75\"
purchase,2025-02-01,category,otc sk,0,any,revenue,3,0
";

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn retention_rows_parse_with_percent_and_ratio_forms() {
    let (facts, report) = read_retention(RETENTION_CSV.as_bytes()).unwrap();

    assert_eq!(report, LoadReport { loaded: 4, skipped: 0, invalid_keys: 0 });
    assert_eq!(facts[0].cohort_month, to_cohort_key("2025-01"));
    assert_eq!(facts[0].dimension, Dimension::Overall);
    assert_eq!(facts[0].segment, Segment::All, "missing segment column defaults to all");
    assert!((facts[0].retention - 1.0).abs() < 1e-9);
    assert!((facts[1].retention - 0.7).abs() < 1e-9);
    assert_eq!(facts[2].metric, Metric::Same);
    assert_eq!(facts[2].dimension_value, "pom hl");
    assert_eq!(facts[3].cohort_month, to_cohort_key("2025-01"));
    assert!((facts[3].retention - 0.25).abs() < 1e-9);
}

#[test]
fn ltv_rows_parse_measure_and_amounts() {
    let (facts, report) = read_ltv(LTV_CSV.as_bytes()).unwrap();

    assert_eq!(report.loaded, 3);
    assert_eq!(facts[0].measure, Measure::GrossMargin);
    assert_eq!(facts[0].ltv_per_user, 120.5);
    assert_eq!(facts[1].ltv_per_user, 1210.75);
    assert_eq!(facts[2].measure, Measure::Revenue);
    // Zero loads fine; the pivot decides it is absent.
    assert_eq!(facts[2].ltv_per_user, 0.0);
}

/// A bad cohort month keeps the row with no key; bad fields skip the row.
#[test]
fn malformed_rows_degrade_without_failing() {
    let csv = "\
cohort_month,dimension,first_value,m,metric,segment,cohort_size,retention
not-a-date,overall,ALL,0,any,all,10,100%
2025-01-01,galaxy,ALL,0,any,all,10,100%
2025-01-01,overall,ALL,x,any,all,10,100%
2025-01-01,overall,ALL,0,any,all,10,n/a
2025-01-01,overall,ALL,0,any,vip,10,100%
2025-01-01,overall,ALL,0,any,one-time,10,100%
2025-01-01,overall,ALL
";
    let (facts, report) = read_retention(csv.as_bytes()).unwrap();

    assert_eq!(report.loaded, 2);
    assert_eq!(report.invalid_keys, 1);
    assert_eq!(report.skipped, 5);
    assert!(facts[0].cohort_month.is_none());
    assert_eq!(facts[1].segment, Segment::OneTime);
}

/// Missing measure column defaults to gross margin.
#[test]
fn ltv_measure_defaults_to_gross_margin() {
    let csv = "\
cohort_month,dimension,first_value,m,metric,cohort_size,ltv_per_user
2025-01-01,overall,ALL,0,any,10,55
";
    let (facts, _) = read_ltv(csv.as_bytes()).unwrap();
    assert_eq!(facts[0].measure, Measure::GrossMargin);
}

#[test]
fn header_only_file_is_empty_not_an_error() {
    let csv = "cohort_month,dimension,first_value,m,metric,cohort_size,retention\n";
    let (facts, report) = read_retention(csv.as_bytes()).unwrap();
    assert!(facts.is_empty());
    assert_eq!(report, LoadReport::default());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_retention_csv("/definitely/not/here.csv").unwrap_err();
    assert!(err.to_string().starts_with("I/O error"), "got: {err}");
}
