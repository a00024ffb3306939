//! Synthetic fact generator — plausible retention and LTV fact sets for
//! demos and tests, fully determined by a seed.
//!
//! Shape guarantees:
//!   - m=0 retention is 1.0 for every group.
//!   - LTV is non-decreasing in m within a group.
//!   - No offset exceeds `months_diff(cohort, last_cohort)`.
//!   - Cohort size is uniform within a group.
//!
//! Retention rows for m>0 are occasionally dropped to leave gaps.

use crate::{
    cac::SpendTable,
    fact::{Dimension, LtvFact, Measure, Metric, RetentionFact, Segment},
    month::{months_diff, MonthKey},
    rng::{FactRng, FactStream},
    types::ALL_SENTINEL,
};

const SEGMENTS: [Segment; 3] = [Segment::All, Segment::Subscribers, Segment::OneTime];
const MARGIN_SHARE: f64 = 0.62;

#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub seed:            u64,
    pub first_cohort:    MonthKey,
    pub cohorts:         u32,
    pub categories:      Vec<String>,
    pub gap_probability: f64,
}

impl SyntheticSpec {
    pub fn new(seed: u64, first_cohort: MonthKey, cohorts: u32) -> Self {
        Self {
            seed,
            first_cohort,
            cohorts,
            categories: vec!["pom hl".into(), "pom bg".into(), "otc sk".into()],
            gap_probability: 0.05,
        }
    }

    pub fn last_cohort(&self) -> MonthKey {
        let span = self.cohorts.saturating_sub(1) as i32;
        self.first_cohort.add_months(span).unwrap_or(self.first_cohort)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticFacts {
    pub retention: Vec<RetentionFact>,
    pub ltv:       Vec<LtvFact>,
    pub spend:     SpendTable,
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

pub fn generate(spec: &SyntheticSpec) -> SyntheticFacts {
    let mut size_rng = FactRng::new(spec.seed, FactStream::CohortSize);
    let mut ret_rng = FactRng::new(spec.seed, FactStream::Retention);
    let mut ltv_rng = FactRng::new(spec.seed, FactStream::Ltv);
    let mut spend_rng = FactRng::new(spec.seed, FactStream::Spend);

    let last = spec.last_cohort();
    let mut slices: Vec<(Dimension, String)> = vec![(Dimension::Overall, ALL_SENTINEL.into())];
    slices.extend(spec.categories.iter().map(|c| (Dimension::Category, c.clone())));

    let mut out = SyntheticFacts::default();

    for i in 0..spec.cohorts {
        let Some(cohort) = spec.first_cohort.add_months(i as i32) else {
            break;
        };
        let window = months_diff(cohort, last);

        for segment in SEGMENTS {
            for (dimension, value) in &slices {
                let size = 5 + size_rng.next_u64_below(200) as u32;
                if segment == Segment::All && *dimension == Dimension::Overall {
                    let per_head = spend_rng.between(150.0, 450.0);
                    out.spend.insert(cohort, round_to(size as f64 * per_head, 2));
                }

                // The source data only splits `same` out for non-overall slices.
                let metrics: &[Metric] = match dimension {
                    Dimension::Overall => &[Metric::Any],
                    Dimension::Category | Dimension::Sku => &[Metric::Any, Metric::Same],
                };

                let mut any = 1.0_f64;
                let mut same = 1.0_f64;
                let mut cum_any = 0.0_f64;
                let mut cum_same = 0.0_f64;

                for m in 0..=window {
                    if m > 0 {
                        any *= ret_rng.between(0.55, 0.9);
                        same = (same * ret_rng.between(0.5, 0.9)).min(any);
                    }
                    let gap = m > 0 && ret_rng.chance(spec.gap_probability);

                    let basket = ltv_rng.between(80.0, 220.0);
                    cum_any += any * basket;
                    cum_same += same * basket * ltv_rng.between(0.6, 1.0);

                    for &metric in metrics {
                        let (ratio, cumulative) = match metric {
                            Metric::Any  => (any, cum_any),
                            Metric::Same => (same, cum_same),
                        };

                        if !gap {
                            out.retention.push(RetentionFact {
                                cohort_month:    Some(cohort),
                                dimension:       *dimension,
                                dimension_value: value.clone(),
                                offset:          m,
                                metric,
                                segment,
                                cohort_size:     size,
                                retention:       round_to(ratio, 4),
                            });
                        }

                        for measure in [Measure::Revenue, Measure::GrossMargin] {
                            let share = match measure {
                                Measure::Revenue     => 1.0,
                                Measure::GrossMargin => MARGIN_SHARE,
                            };
                            out.ltv.push(LtvFact {
                                cohort_month:    Some(cohort),
                                dimension:       *dimension,
                                dimension_value: value.clone(),
                                offset:          m,
                                metric,
                                segment,
                                measure,
                                cohort_size:     size,
                                ltv_per_user:    round_to(cumulative * share, 2),
                            });
                        }
                    }
                }
            }
        }
    }

    log::info!(
        "synthetic: seed {} produced {} retention and {} LTV facts over {} cohorts",
        spec.seed,
        out.retention.len(),
        out.ltv.len(),
        spec.cohorts
    );
    out
}
