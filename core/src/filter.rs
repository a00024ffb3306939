//! Filter predicate — decides whether one fact row belongs in a view.
//!
//! RULE: Filtering is a pure full scan over the fact set on every call.
//! Selection state is an explicit `FilterCriteria` value passed in by the
//! caller; the core holds no ambient "current filter".

use crate::{
    fact::{CohortFact, Dimension, Measure, Metric, Segment},
    month::MonthKey,
    types::ALL_SENTINEL,
};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterCriteria {
    pub dimension:       Dimension,
    pub metric:          Metric,
    pub segment:         Segment,
    /// Ignored when `dimension` is `overall`; those rows always carry "ALL".
    #[serde(default = "default_dimension_value")]
    pub dimension_value: String,
    /// Empty or missing means open.
    #[serde(default, deserialize_with = "open_bound")]
    pub start_month:     Option<MonthKey>,
    #[serde(default, deserialize_with = "open_bound")]
    pub end_month:       Option<MonthKey>,
    /// Only consulted for facts that carry a measure (LTV).
    #[serde(default = "default_measure")]
    pub measure:         Measure,
}

fn default_dimension_value() -> String {
    ALL_SENTINEL.to_string()
}

fn default_measure() -> Measure {
    Measure::GrossMargin
}

/// A range bound arrives as null, "" or "YYYY-MM"; blank strings are open.
fn open_bound<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<MonthKey>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            dimension:       Dimension::Overall,
            metric:          Metric::Any,
            segment:         Segment::All,
            dimension_value: default_dimension_value(),
            start_month:     None,
            end_month:       None,
            measure:         default_measure(),
        }
    }
}

impl FilterCriteria {
    /// Criteria for one category or SKU value.
    pub fn for_value(dimension: Dimension, value: impl Into<String>) -> Self {
        Self {
            dimension,
            dimension_value: value.into(),
            ..Self::default()
        }
    }

    pub fn matches<F: CohortFact>(&self, row: &F) -> bool {
        if row.segment() != self.segment || row.dimension() != self.dimension {
            return false;
        }

        let value_ok = match self.dimension {
            Dimension::Overall => row.dimension_value() == ALL_SENTINEL,
            Dimension::Category | Dimension::Sku => row.dimension_value() == self.dimension_value,
        };
        if !value_ok || row.metric() != self.metric {
            return false;
        }

        if let Some(measure) = row.measure() {
            if measure != self.measure {
                return false;
            }
        }

        // Range bounds compare against the cohort key; a row with no valid
        // key can only pass when both bounds are open.
        let key = row.cohort_month();
        let after_start = match self.start_month {
            None => true,
            Some(start) => key.is_some_and(|k| k >= start),
        };
        let before_end = match self.end_month {
            None => true,
            Some(end) => key.is_some_and(|k| k <= end),
        };
        after_start && before_end
    }
}

/// Every row of `facts` that passes `criteria`, in input order.
pub fn filter_facts<'a, F: CohortFact>(facts: &'a [F], criteria: &FilterCriteria) -> Vec<&'a F> {
    facts.iter().filter(|row| criteria.matches(*row)).collect()
}
