//! Attach metrics — non-subscription revenue layered on the base membership.
//!
//! The caller assembles the per-member map from its revenue tables and drops
//! unattributed amounts before calling in. No attribution happens here.

use crate::types::{MemberId, Money, Ratio};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attach rate and all-in ARPM when there are no active members.
pub const ATTACH_FALLBACK: Decimal = Decimal::ZERO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachMetrics {
    pub attach_revenue:      Money,
    pub members_with_attach: u64,
    pub attach_rate:         Ratio,
    pub all_in_arpm:         Money,
}

pub fn compute_attach_metrics(
    member_revenue: &HashMap<MemberId, Money>,
    attach_revenue_total: Money,
    active_member_count: u64,
    base_revenue_total: Money,
) -> AttachMetrics {
    let members_with_attach = member_revenue
        .values()
        .filter(|amount| **amount > Decimal::ZERO)
        .count() as u64;

    let (attach_rate, all_in_arpm) = if active_member_count > 0 {
        let active = Decimal::from(active_member_count);
        let all_in = match base_revenue_total.checked_add(attach_revenue_total) {
            Some(total) => total / active,
            None => {
                log::warn!(
                    "attach: base {} + attach {} overflows, all-in ARPM set to fallback",
                    base_revenue_total,
                    attach_revenue_total,
                );
                ATTACH_FALLBACK
            }
        };
        (Decimal::from(members_with_attach) / active, all_in)
    } else {
        (ATTACH_FALLBACK, ATTACH_FALLBACK)
    };

    AttachMetrics {
        attach_revenue: attach_revenue_total,
        members_with_attach,
        attach_rate,
        all_in_arpm,
    }
}
