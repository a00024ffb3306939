//! Fact loading from the upstream tabular exports.
//!
//! Retention layout:
//!   cohort_month, dimension, first_value, m, metric, [segment], cohort_size, retention
//! LTV layout:
//!   [cohort_type], cohort_month, dimension, first_value, m, metric, measure,
//!   [segment], cohort_size, ltv_per_user
//!
//! RULE: A malformed row never fails the load. An unparseable cohort month
//! keeps the row with no key (it is excluded from every grouping later);
//! any other unparseable field skips the row. Only I/O failures surface
//! as errors.

use crate::{
    error::CohortResult,
    fact::{LtvFact, Measure, RetentionFact, Segment},
    month::to_cohort_key,
    ratio::{parse_amount, parse_count, parse_ratio},
};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Read, path::Path};

/// Row counts for one load.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded:       usize,
    pub skipped:      usize,
    /// Loaded rows whose cohort month could not be parsed.
    pub invalid_keys: usize,
}

#[derive(Debug, Deserialize)]
struct RawRetentionRecord {
    cohort_month: String,
    dimension:    String,
    #[serde(alias = "dimension_value")]
    first_value:  String,
    m:            String,
    metric:       String,
    #[serde(default)]
    segment:      Option<String>,
    cohort_size:  String,
    retention:    String,
}

#[derive(Debug, Deserialize)]
struct RawLtvRecord {
    cohort_month: String,
    dimension:    String,
    #[serde(alias = "dimension_value")]
    first_value:  String,
    m:            String,
    metric:       String,
    #[serde(default)]
    measure:      Option<String>,
    #[serde(default)]
    segment:      Option<String>,
    cohort_size:  String,
    ltv_per_user: String,
}

fn parse_segment(raw: Option<&str>) -> Option<Segment> {
    match raw.map(str::trim) {
        None | Some("") => Some(Segment::All),
        Some(s) => s.parse().ok(),
    }
}

fn parse_measure(raw: Option<&str>) -> Option<Measure> {
    match raw.map(str::trim) {
        None | Some("") => Some(Measure::GrossMargin),
        Some(s) => s.parse().ok(),
    }
}

impl RawRetentionRecord {
    fn into_fact(self) -> Option<RetentionFact> {
        Some(RetentionFact {
            cohort_month:    to_cohort_key(&self.cohort_month),
            dimension:       self.dimension.parse().ok()?,
            dimension_value: self.first_value.trim().to_string(),
            offset:          parse_count(&self.m)?,
            metric:          self.metric.parse().ok()?,
            segment:         parse_segment(self.segment.as_deref())?,
            cohort_size:     parse_count(&self.cohort_size)?,
            retention:       parse_ratio(self.retention.as_str())?,
        })
    }
}

impl RawLtvRecord {
    fn into_fact(self) -> Option<LtvFact> {
        Some(LtvFact {
            cohort_month:    to_cohort_key(&self.cohort_month),
            dimension:       self.dimension.parse().ok()?,
            dimension_value: self.first_value.trim().to_string(),
            offset:          parse_count(&self.m)?,
            metric:          self.metric.parse().ok()?,
            segment:         parse_segment(self.segment.as_deref())?,
            measure:         parse_measure(self.measure.as_deref())?,
            cohort_size:     parse_count(&self.cohort_size)?,
            ltv_per_user:    parse_amount(&self.ltv_per_user)?,
        })
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Shared record loop. `convert` returns the fact and whether its key is
/// valid, or `None` to skip the row.
fn read_facts<R, Raw, T>(
    reader: R,
    kind: &str,
    convert: impl Fn(Raw) -> Option<(T, bool)>,
) -> CohortResult<(Vec<T>, LoadReport)>
where
    R: Read,
    Raw: for<'de> Deserialize<'de>,
{
    let mut rdr = csv_reader(reader);
    let mut facts = Vec::new();
    let mut report = LoadReport::default();

    for (line, result) in rdr.deserialize::<Raw>().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::debug!("{kind} row {}: undecodable ({e}), skipped", line + 1);
                report.skipped += 1;
                continue;
            }
        };
        match convert(raw) {
            Some((fact, key_ok)) => {
                if !key_ok {
                    log::debug!("{kind} row {}: unparseable cohort month", line + 1);
                    report.invalid_keys += 1;
                }
                report.loaded += 1;
                facts.push(fact);
            }
            None => {
                log::debug!("{kind} row {}: malformed field, skipped", line + 1);
                report.skipped += 1;
            }
        }
    }

    log::info!(
        "{kind}: loaded {} rows ({} skipped, {} without a valid cohort month)",
        report.loaded,
        report.skipped,
        report.invalid_keys
    );
    Ok((facts, report))
}

pub fn read_retention<R: Read>(reader: R) -> CohortResult<(Vec<RetentionFact>, LoadReport)> {
    read_facts(reader, "retention", |raw: RawRetentionRecord| {
        raw.into_fact().map(|f| {
            let key_ok = f.cohort_month.is_some();
            (f, key_ok)
        })
    })
}

pub fn read_ltv<R: Read>(reader: R) -> CohortResult<(Vec<LtvFact>, LoadReport)> {
    read_facts(reader, "ltv", |raw: RawLtvRecord| {
        raw.into_fact().map(|f| {
            let key_ok = f.cohort_month.is_some();
            (f, key_ok)
        })
    })
}

pub fn load_retention_csv(path: impl AsRef<Path>) -> CohortResult<(Vec<RetentionFact>, LoadReport)> {
    read_retention(File::open(path)?)
}

pub fn load_ltv_csv(path: impl AsRef<Path>) -> CohortResult<(Vec<LtvFact>, LoadReport)> {
    read_ltv(File::open(path)?)
}
