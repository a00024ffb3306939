//! The cohort dashboard — owns one immutable fact snapshot and answers
//! view requests with freshly built matrices.
//!
//! FLOW (per request, nothing cached between calls):
//!   1. Filter predicate over the full fact set
//!   2. Pivot builder (retention or LTV) against the observation boundary
//!   3. LTV only: CAC / break-even overlay per cohort row
//!
//! RULES:
//!   - Facts are read-only once the dashboard is built.
//!   - Every view is a pure function of (facts, config, criteria).
//!   - The boundary is fixed at construction: configured override first,
//!     otherwise derived from offset-0 facts.

use crate::{
    cac::CacOverlay,
    config::CohortConfig,
    fact::{CohortFact, Dimension, LtvFact, RetentionFact},
    filter::FilterCriteria,
    loader::{load_ltv_csv, load_retention_csv},
    month::MonthKey,
    pivot::{build_ltv_pivot, build_retention_pivot, observation_boundary, CohortPivotRow, RetentionPivot},
    synthetic::{generate, SyntheticSpec},
    types::Offset,
};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LtvViewRow {
    #[serde(flatten)]
    pub row:     CohortPivotRow,
    #[serde(flatten)]
    pub overlay: CacOverlay,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LtvView {
    pub rows:             Vec<LtvViewRow>,
    pub max_month:        Offset,
    pub max_value:        f64,
    /// Currency of `cac`; cell values stay in ledger currency.
    pub display_currency: String,
}

/// Choices for the selection widgets of one dimension.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilterOptions {
    pub dimension:     Dimension,
    pub values:        Vec<String>,
    pub cohort_months: Vec<MonthKey>,
}

pub struct CohortDashboard {
    pub config: CohortConfig,
    retention:  Vec<RetentionFact>,
    ltv:        Vec<LtvFact>,
    boundary:   Option<MonthKey>,
}

impl CohortDashboard {
    pub fn new(retention: Vec<RetentionFact>, ltv: Vec<LtvFact>, config: CohortConfig) -> Self {
        let boundary = config.observed_through.or_else(|| {
            observation_boundary(&retention).max(observation_boundary(&ltv))
        });
        match boundary {
            Some(b) => log::info!("observation boundary: {b}"),
            None => log::info!("no offset-0 facts; observation window unbounded"),
        }
        Self { config, retention, ltv, boundary }
    }

    /// Load config and both fact tables from `data_dir`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let config = CohortConfig::load(data_dir)?;

        let retention_path = config.retention_path(data_dir);
        let (retention, _) = load_retention_csv(&retention_path)
            .map_err(|e| anyhow::anyhow!("Cannot load {retention_path}: {e}"))?;

        let ltv_path = config.ltv_path(data_dir);
        let (ltv, _) = load_ltv_csv(&ltv_path)
            .map_err(|e| anyhow::anyhow!("Cannot load {ltv_path}: {e}"))?;

        Ok(Self::new(retention, ltv, config))
    }

    /// Build over generated facts. Generated spend fills in only when the
    /// config carries none.
    pub fn from_synthetic(spec: &SyntheticSpec, mut config: CohortConfig) -> Self {
        let facts = generate(spec);
        if config.marketing_spend.is_empty() {
            config.marketing_spend = facts.spend;
        }
        Self::new(facts.retention, facts.ltv, config)
    }

    pub fn observation_boundary(&self) -> Option<MonthKey> {
        self.boundary
    }

    pub fn retention_facts(&self) -> &[RetentionFact] {
        &self.retention
    }

    pub fn ltv_facts(&self) -> &[LtvFact] {
        &self.ltv
    }

    pub fn retention_view(&self, criteria: &FilterCriteria) -> RetentionPivot {
        let rows = self.retention.iter().filter(|r| criteria.matches(*r));
        build_retention_pivot(rows, self.boundary)
    }

    pub fn ltv_view(&self, criteria: &FilterCriteria) -> LtvView {
        let rows = self.ltv.iter().filter(|r| criteria.matches(*r));
        let pivot = build_ltv_pivot(rows, self.boundary);

        let spend = &self.config.marketing_spend;
        let currency = &self.config.currency;
        let rows = pivot
            .rows
            .into_iter()
            .map(|row| {
                let overlay = CacOverlay::for_row(&row, spend, currency, pivot.max_month);
                LtvViewRow { row, overlay }
            })
            .collect();

        LtvView {
            rows,
            max_month: pivot.max_month,
            max_value: pivot.max_value,
            display_currency: currency.display_currency.clone(),
        }
    }

    pub fn filter_options(&self, dimension: Dimension) -> FilterOptions {
        let mut values = BTreeSet::new();
        let mut months = BTreeSet::new();

        let retention = self.retention.iter().map(|f| f as &dyn CohortFact);
        let ltv = self.ltv.iter().map(|f| f as &dyn CohortFact);
        for fact in retention.chain(ltv) {
            if let Some(key) = fact.cohort_month() {
                months.insert(key);
            }
            if fact.dimension() == dimension {
                values.insert(fact.dimension_value().to_string());
            }
        }

        FilterOptions {
            dimension,
            values: values.into_iter().collect(),
            cohort_months: months.into_iter().collect(),
        }
    }
}
