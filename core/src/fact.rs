//! Fact row model — the typed shape of one retention fact and one LTV fact.
//!
//! Facts are produced by an upstream batch job and consumed read-only.
//! Nothing in the core mutates a fact after it has been loaded.

use crate::{error::CohortError, month::MonthKey, types::Offset};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ── Closed enumerations ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Overall,
    Category,
    Sku,
}

/// Which purchases count as activity for a cohort member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Any,   // activity in any product
    Same,  // activity only within the first-purchase category
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    All,
    Subscribers,
    #[serde(alias = "one-time")]
    OneTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Revenue,
    GrossMargin,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overall  => "overall",
            Self::Category => "category",
            Self::Sku      => "sku",
        }
    }
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any  => "any",
            Self::Same => "same",
        }
    }
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All         => "all",
            Self::Subscribers => "subscribers",
            Self::OneTime     => "one_time",
        }
    }
}

impl Measure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue     => "revenue",
            Self::GrossMargin => "gross_margin",
        }
    }
}

fn normalized(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn unknown(field: &'static str, raw: &str) -> CohortError {
    CohortError::UnknownValue { field, raw: raw.to_string() }
}

impl FromStr for Dimension {
    type Err = CohortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "overall"  => Ok(Self::Overall),
            "category" => Ok(Self::Category),
            "sku"      => Ok(Self::Sku),
            _ => Err(unknown("dimension", s)),
        }
    }
}

impl FromStr for Metric {
    type Err = CohortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "any"  => Ok(Self::Any),
            "same" => Ok(Self::Same),
            _ => Err(unknown("metric", s)),
        }
    }
}

impl FromStr for Segment {
    type Err = CohortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "all" => Ok(Self::All),
            "subscribers" | "subscriber" => Ok(Self::Subscribers),
            "one_time" | "one-time" | "onetime" => Ok(Self::OneTime),
            _ => Err(unknown("segment", s)),
        }
    }
}

impl FromStr for Measure {
    type Err = CohortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "revenue" => Ok(Self::Revenue),
            "gross_margin" | "gross-margin" | "margin" => Ok(Self::GrossMargin),
            _ => Err(unknown("measure", s)),
        }
    }
}

// ── Fact rows ──────────────────────────────────────────────────────

/// One retention fact. `cohort_month` is `None` when the upstream date
/// could not be parsed; such rows never reach a pivot group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetentionFact {
    pub cohort_month:    Option<MonthKey>,
    pub dimension:       Dimension,
    pub dimension_value: String,
    pub offset:          Offset,
    pub metric:          Metric,
    pub segment:         Segment,
    pub cohort_size:     u32,
    /// Fraction of the cohort active at `offset`. Subscription-aware
    /// upstream; treated here as an opaque magnitude.
    pub retention:       f64,
}

/// One LTV fact. `ltv_per_user` is cumulative from offset 0 through
/// `offset` inclusive, in ledger currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LtvFact {
    pub cohort_month:    Option<MonthKey>,
    pub dimension:       Dimension,
    pub dimension_value: String,
    pub offset:          Offset,
    pub metric:          Metric,
    pub segment:         Segment,
    pub measure:         Measure,
    pub cohort_size:     u32,
    pub ltv_per_user:    f64,
}

/// Read access shared by both fact kinds, so the filter predicate and
/// boundary derivation are written once.
pub trait CohortFact {
    fn cohort_month(&self) -> Option<MonthKey>;
    fn dimension(&self) -> Dimension;
    fn dimension_value(&self) -> &str;
    fn offset(&self) -> Offset;
    fn metric(&self) -> Metric;
    fn segment(&self) -> Segment;
    /// `None` for fact kinds that carry no measure.
    fn measure(&self) -> Option<Measure>;
    fn cohort_size(&self) -> u32;
    fn value(&self) -> f64;
}

impl CohortFact for RetentionFact {
    fn cohort_month(&self) -> Option<MonthKey> { self.cohort_month }
    fn dimension(&self) -> Dimension           { self.dimension }
    fn dimension_value(&self) -> &str          { &self.dimension_value }
    fn offset(&self) -> Offset                 { self.offset }
    fn metric(&self) -> Metric                 { self.metric }
    fn segment(&self) -> Segment               { self.segment }
    fn measure(&self) -> Option<Measure>       { None }
    fn cohort_size(&self) -> u32               { self.cohort_size }
    fn value(&self) -> f64                     { self.retention }
}

impl CohortFact for LtvFact {
    fn cohort_month(&self) -> Option<MonthKey> { self.cohort_month }
    fn dimension(&self) -> Dimension           { self.dimension }
    fn dimension_value(&self) -> &str          { &self.dimension_value }
    fn offset(&self) -> Offset                 { self.offset }
    fn metric(&self) -> Metric                 { self.metric }
    fn segment(&self) -> Segment               { self.segment }
    fn measure(&self) -> Option<Measure>       { Some(self.measure) }
    fn cohort_size(&self) -> u32               { self.cohort_size }
    fn value(&self) -> f64                     { self.ltv_per_user }
}
