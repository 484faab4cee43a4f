//! Threshold alerts over a monthly summary.
//!
//! Evaluation is pure. A `None` threshold disables its check. Attach-rate
//! checks are skipped for months that carry no attach metrics.

use crate::{
    calendar::MonthKey,
    summary::MonthlySummary,
    types::Ratio,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    #[serde(default)]
    pub min_nrr:                Option<Ratio>,
    #[serde(default)]
    pub min_grr:                Option<Ratio>,
    #[serde(default)]
    pub max_logo_churn_rate:    Option<Ratio>,
    #[serde(default)]
    pub max_revenue_churn_rate: Option<Ratio>,
    #[serde(default)]
    pub min_attach_rate:        Option<Ratio>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMetric {
    Nrr,
    Grr,
    LogoChurnRate,
    RevenueChurnRate,
    AttachRate,
}

impl AlertMetric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Nrr              => "NRR",
            Self::Grr              => "GRR",
            Self::LogoChurnRate    => "logo churn rate",
            Self::RevenueChurnRate => "revenue churn rate",
            Self::AttachRate       => "attach rate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricAlert {
    pub month:     MonthKey,
    pub metric:    AlertMetric,
    pub value:     Ratio,
    pub threshold: Ratio,
}

#[derive(Clone, Copy)]
enum Bound {
    Floor,
    Ceiling,
}

pub fn evaluate_alerts(summary: &MonthlySummary, thresholds: &AlertThresholds) -> Vec<MetricAlert> {
    let r = &summary.retention;
    let attach_rate = summary.attach.map(|a| a.attach_rate);

    let checks = [
        (AlertMetric::Nrr,              Some(r.nrr),                thresholds.min_nrr,                Bound::Floor),
        (AlertMetric::Grr,              Some(r.grr),                thresholds.min_grr,                Bound::Floor),
        (AlertMetric::LogoChurnRate,    Some(r.logo_churn_rate),    thresholds.max_logo_churn_rate,    Bound::Ceiling),
        (AlertMetric::RevenueChurnRate, Some(r.revenue_churn_rate), thresholds.max_revenue_churn_rate, Bound::Ceiling),
        (AlertMetric::AttachRate,       attach_rate,                thresholds.min_attach_rate,        Bound::Floor),
    ];

    checks
        .into_iter()
        .filter_map(|(metric, value, threshold, bound)| {
            let (value, threshold) = (value?, threshold?);
            let breached = match bound {
                Bound::Floor   => value < threshold,
                Bound::Ceiling => value > threshold,
            };
            breached.then_some(MetricAlert {
                month: summary.month,
                metric,
                value,
                threshold,
            })
        })
        .collect()
}

/// `evaluate_alerts`, logging each breach at warn level.
pub fn evaluate_and_log(summary: &MonthlySummary, thresholds: &AlertThresholds) -> Vec<MetricAlert> {
    let alerts = evaluate_alerts(summary, thresholds);
    for alert in &alerts {
        log::warn!(
            "{}: {} {} breaches threshold {}",
            alert.month,
            alert.metric.label(),
            alert.value.round_dp(4),
            alert.threshold,
        );
    }
    alerts
}
