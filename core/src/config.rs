use crate::{alerts::AlertThresholds, error::AnalyticsResult};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Months of snapshots the report binary loads when none is given.
    pub window_months: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { window_months: 6 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub alerts: AlertThresholds,
    #[serde(default)]
    pub report: ReportConfig,
}

impl AnalyticsConfig {
    /// Load from the data/ directory.
    /// In tests, use AnalyticsConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/analytics/analytics_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_json(&content)?)
    }

    pub fn from_json(content: &str) -> AnalyticsResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            alerts: AlertThresholds {
                min_nrr:                Some(dec!(0.95)),
                min_grr:                Some(dec!(0.90)),
                max_logo_churn_rate:    Some(dec!(0.05)),
                max_revenue_churn_rate: Some(dec!(0.05)),
                min_attach_rate:        Some(dec!(0.10)),
            },
            report: ReportConfig { window_months: 3 },
        }
    }
}
