use crate::{
    cac::SpendTable,
    currency::CurrencyConfig,
    month::{to_cohort_key, MonthKey},
    ratio::parse_amount,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactFiles {
    pub retention: String,
    pub ltv:       String,
}

impl Default for FactFiles {
    fn default() -> Self {
        Self {
            retention: "purchase_retention.csv".into(),
            ltv:       "ltv_by_category_sku.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CohortConfigFile {
    #[serde(default)]
    currency:        CurrencyConfig,
    #[serde(default)]
    facts:           FactFiles,
    #[serde(default)]
    observed_through: Option<MonthKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CohortConfig {
    pub currency:         CurrencyConfig,
    pub facts:            FactFiles,
    /// Overrides the boundary derived from offset-0 facts when set.
    pub observed_through: Option<MonthKey>,
    pub marketing_spend:  SpendTable,
}

impl CohortConfig {
    /// Load from the data/ directory.
    /// In tests, use CohortConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config/cohort_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: CohortConfigFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        file.currency.validate()?;

        // Spend is optional: no file means no CAC anywhere.
        let spend_path = format!("{data_dir}/marketing/spend.json");
        let marketing_spend: SpendTable = if Path::new(&spend_path).exists() {
            let spend_content = std::fs::read_to_string(&spend_path)
                .map_err(|e| anyhow::anyhow!("Cannot read {spend_path}: {e}"))?;
            let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&spend_content)
                .map_err(|e| anyhow::anyhow!("Cannot parse {spend_path}: {e}"))?;
            spend_from_entries(raw)
        } else {
            log::info!("{spend_path} not found; CAC overlay disabled");
            SpendTable::new()
        };

        Ok(Self {
            currency: file.currency,
            facts: file.facts,
            observed_through: file.observed_through,
            marketing_spend,
        })
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            currency: CurrencyConfig::default(),
            facts: FactFiles::default(),
            observed_through: None,
            marketing_spend: SpendTable::new(),
        }
    }

    pub fn retention_path(&self, data_dir: &str) -> String {
        format!("{data_dir}/{}", self.facts.retention)
    }

    pub fn ltv_path(&self, data_dir: &str) -> String {
        format!("{data_dir}/{}", self.facts.ltv)
    }
}

/// Keep every entry with a valid month key and a finite amount. Bad
/// entries are dropped one by one; the rest of the table still loads.
fn spend_from_entries(raw: BTreeMap<String, serde_json::Value>) -> SpendTable {
    let mut spend = SpendTable::new();
    for (raw_key, value) in raw {
        let Some(month) = to_cohort_key(&raw_key) else {
            log::debug!("spend: skipping entry with invalid month key '{raw_key}'");
            continue;
        };
        let amount = match &value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => parse_amount(s),
            _ => None,
        };
        match amount.filter(|a| a.is_finite()) {
            Some(a) => {
                spend.insert(month, a);
            }
            None => log::debug!("spend: skipping {raw_key} with amount {value}"),
        }
    }
    spend
}
