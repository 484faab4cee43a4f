//! Retention ratios derived from a bridge and its member counts.
//!
//! A zero denominator selects a named fallback instead of dividing: a cohort
//! with no starting revenue reports perfect retention and no churn.

use crate::{
    bridge::MrrBridge,
    counts::MemberCounts,
    types::Ratio,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// NRR and GRR when there was no starting MRR.
pub const RETENTION_RATIO_FALLBACK: Ratio = Decimal::ONE;

/// Logo and revenue churn rates when the denominator is zero.
pub const CHURN_RATE_FALLBACK: Ratio = Decimal::ZERO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionRates {
    pub nrr:                Ratio,
    pub grr:                Ratio,
    pub logo_churn_rate:    Ratio,
    pub revenue_churn_rate: Ratio,
}

// Paused MRR does not enter NRR or GRR.
pub fn compute_retention_rates(
    bridge: &MrrBridge,
    counts: &MemberCounts,
    starting_member_count: u64,
) -> RetentionRates {
    let start = bridge.starting_mrr;

    let (nrr, grr, revenue_churn_rate) = if start > Decimal::ZERO {
        (
            (start + bridge.expansion_mrr - bridge.contraction_mrr - bridge.churned_mrr) / start,
            (start - bridge.contraction_mrr - bridge.churned_mrr) / start,
            bridge.churned_mrr / start,
        )
    } else {
        (RETENTION_RATIO_FALLBACK, RETENTION_RATIO_FALLBACK, CHURN_RATE_FALLBACK)
    };

    let logo_churn_rate = if starting_member_count > 0 {
        Decimal::from(counts.churned_members) / Decimal::from(starting_member_count)
    } else {
        CHURN_RATE_FALLBACK
    };

    RetentionRates {
        nrr,
        grr,
        logo_churn_rate,
        revenue_churn_rate,
    }
}
