//! Fixed-rate currency conversion, ledger → display.
//!
//! The rate is a process-wide constant supplied by configuration.
//! Spend and every compared LTV cell go through the same `convert`, so
//! CAC comparisons stay unit-consistent whatever rate is configured.

use crate::error::{CohortError, CohortResult};
use serde::{Deserialize, Serialize};

/// AED is pegged at 3.6725 per USD.
pub const DEFAULT_LEDGER_TO_DISPLAY_RATE: f64 = 1.0 / 3.6725;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyConfig {
    pub ledger_currency:        String,
    pub display_currency:       String,
    pub ledger_to_display_rate: f64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            ledger_currency:        "AED".into(),
            display_currency:       "USD".into(),
            ledger_to_display_rate: DEFAULT_LEDGER_TO_DISPLAY_RATE,
        }
    }
}

impl CurrencyConfig {
    pub fn validate(&self) -> CohortResult<()> {
        let rate = self.ledger_to_display_rate;
        if rate.is_finite() && rate > 0.0 {
            Ok(())
        } else {
            Err(CohortError::InvalidRate { rate })
        }
    }

    /// Convert a ledger-currency amount to display currency.
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.ledger_to_display_rate
    }
}
