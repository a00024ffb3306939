//! Month key derivation and offset arithmetic.

use chrono::NaiveDate;
use cohort_core::{
    month::{add_months, month_key_from_date, months_diff, months_diff_raw, to_cohort_key, MonthKey},
    rng::{FactRng, FactStream},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn key(raw: &str) -> MonthKey {
    to_cohort_key(raw).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// For every valid (year, month), the key reproduces the zero-padded parts.
#[test]
fn key_round_trips_zero_padded_parts() {
    let mut rng = FactRng::new(7, FactStream::CohortSize);
    for _ in 0..500 {
        let year = 1900 + rng.next_u64_below(300) as i32;
        let month = 1 + rng.next_u64_below(12) as u32;
        let raw = format!("{year}-{month}-15 10:00:00");

        let k = to_cohort_key(&raw).expect("valid date must produce a key");
        let rendered = k.to_string();
        let parts: Vec<&str> = rendered.split('-').collect();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], format!("{year:04}"));
        assert_eq!(parts[1], format!("{month:02}"));
    }
}

/// Time components after the first space are discarded.
#[test]
fn time_component_is_ignored() {
    assert_eq!(key("2025-03-31 23:59:59").to_string(), "2025-03");
    assert_eq!(key("2025-03-01").to_string(), "2025-03");
    assert_eq!(key("2025-03").to_string(), "2025-03");
}

/// Malformed strings yield the invalid marker instead of panicking.
#[test]
fn malformed_dates_are_invalid_not_fatal() {
    for raw in ["", "   ", "garbage", "2025", "2025-xx-01", "abcd-01", "2025-13-01", "2025-00-10", "31/01/2025"] {
        assert!(to_cohort_key(raw).is_none(), "{raw:?} should be invalid");
    }
}

/// months_diff is never negative and is zero on the diagonal.
#[test]
fn months_diff_is_non_negative() {
    let mut rng = FactRng::new(99, FactStream::Retention);
    for _ in 0..500 {
        let a = MonthKey::new(2000 + rng.next_u64_below(40) as i32, 1 + rng.next_u64_below(12) as u32).unwrap();
        let b = MonthKey::new(2000 + rng.next_u64_below(40) as i32, 1 + rng.next_u64_below(12) as u32).unwrap();
        assert_eq!(months_diff(a, a), 0);
        let forward = months_diff(a, b);
        let backward = months_diff(b, a);
        // One direction is always clamped to zero.
        assert!(forward == 0 || backward == 0);
    }
}

#[test]
fn months_diff_spans_year_boundaries() {
    assert_eq!(months_diff(key("2024-11"), key("2025-02")), 3);
    assert_eq!(months_diff(key("2025-01"), key("2025-03")), 2);
    assert_eq!(months_diff(key("2025-03"), key("2025-01")), 0);
}

/// Any unparseable side yields zero.
#[test]
fn months_diff_raw_treats_garbage_as_zero() {
    assert_eq!(months_diff_raw("2025-01-01", "2025-06-01"), 5);
    assert_eq!(months_diff_raw("nope", "2025-06-01"), 0);
    assert_eq!(months_diff_raw("2025-01-01", ""), 0);
}

/// Lexicographic order of rendered keys matches key order.
#[test]
fn key_order_matches_string_order() {
    let mut keys = vec![key("2025-10"), key("2024-12"), key("2025-02"), key("2025-01")];
    let mut rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    keys.sort();
    rendered.sort();
    let resorted: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    assert_eq!(resorted, rendered);
}

#[test]
fn add_months_and_key_projection() {
    let d = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
    let next = add_months(d, 1).unwrap();
    assert_eq!(next, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(month_key_from_date(next), Some(key("2025-01")));
    assert_eq!(key("2025-01").add_months(12), Some(key("2026-01")));
}

#[test]
fn month_key_serializes_as_string() {
    let k = key("2025-07");
    assert_eq!(serde_json::to_string(&k).unwrap(), "\"2025-07\"");
    let back: MonthKey = serde_json::from_str("\"2025-07-01\"").unwrap();
    assert_eq!(back, k);
    assert!(serde_json::from_str::<MonthKey>("\"July\"").is_err());
}
