//! Monthly summaries — one bridge, count, retention and attach bundle per
//! month transition, plus the series built from a chronological run of
//! monthly snapshots.
//!
//! Snapshot anomalies never stop a summary. They are attached to it as
//! `SnapshotWarning`s so the dashboard can flag an incomplete month.

use crate::{
    attach::{compute_attach_metrics, AttachMetrics},
    bridge::{compute_mrr_bridge, MrrBridge},
    calendar::{prior_month_start, MonthKey},
    counts::{compute_member_counts, paying_member_count, MemberCounts},
    retention::{compute_retention_rates, RetentionRates},
    snapshot::{MemberSnapshot, MAX_MRR},
    types::{MemberId, Money},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Attach revenue for a month, already filtered to attributed members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachInput {
    pub member_revenue:       HashMap<MemberId, Money>,
    pub attach_revenue_total: Money,
    pub base_revenue_total:   Money,
}

/// Everything the store holds for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSnapshots {
    pub month:   MonthKey,
    pub members: Vec<MemberSnapshot>,
    #[serde(default)]
    pub attach:  Option<AttachInput>,
}

impl MonthSnapshots {
    pub fn new(month: MonthKey, members: Vec<MemberSnapshot>) -> Self {
        Self { month, members, attach: None }
    }

    pub fn with_attach(mut self, attach: AttachInput) -> Self {
        self.attach = Some(attach);
        self
    }
}

// ── Outputs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotWarning {
    /// No snapshot rows at all for the month.
    EmptyMonth { month: MonthKey },
    /// A row dated to a different month than the list it arrived in.
    MixedSnapshotMonth { month: MonthKey, member_id: MemberId, found: MonthKey },
    DuplicateMember { month: MonthKey, member_id: MemberId },
    NegativeMrr { month: MonthKey, member_id: MemberId, mrr: Money },
    /// MRR finer than a cent. Calculators use the amount rounded to cents.
    ExcessPrecision { month: MonthKey, member_id: MemberId, mrr: Money },
    /// MRR above `MAX_MRR`. Calculators treat the row as zero.
    AmountOutOfRange { month: MonthKey, member_id: MemberId, mrr: Money },
    /// The prior snapshot is not the calendar month before the current one.
    NonAdjacentMonths { prior: MonthKey, current: MonthKey },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month:                 MonthKey,
    pub prior_month:           MonthKey,
    pub bridge:                MrrBridge,
    pub counts:                MemberCounts,
    pub starting_member_count: u64,
    pub retention:             RetentionRates,
    pub attach:                Option<AttachMetrics>,
    pub warnings:              Vec<SnapshotWarning>,
}

impl MonthlySummary {
    /// True when no snapshot anomaly was found for either month.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

pub fn validate_month(snapshots: &MonthSnapshots) -> Vec<SnapshotWarning> {
    let month = snapshots.month;
    let mut warnings = Vec::new();

    if snapshots.members.is_empty() {
        warnings.push(SnapshotWarning::EmptyMonth { month });
        return warnings;
    }

    let mut seen = BTreeSet::new();
    for row in &snapshots.members {
        if row.snapshot_month != month {
            warnings.push(SnapshotWarning::MixedSnapshotMonth {
                month,
                member_id: row.member_id.clone(),
                found: row.snapshot_month,
            });
        }
        if !seen.insert(row.member_id.as_str()) {
            warnings.push(SnapshotWarning::DuplicateMember {
                month,
                member_id: row.member_id.clone(),
            });
        }
        if row.mrr < Decimal::ZERO {
            warnings.push(SnapshotWarning::NegativeMrr {
                month,
                member_id: row.member_id.clone(),
                mrr: row.mrr,
            });
        } else if row.mrr > MAX_MRR {
            warnings.push(SnapshotWarning::AmountOutOfRange {
                month,
                member_id: row.member_id.clone(),
                mrr: row.mrr,
            });
        } else if row.has_excess_precision() {
            warnings.push(SnapshotWarning::ExcessPrecision {
                month,
                member_id: row.member_id.clone(),
                mrr: row.mrr,
            });
        }
    }

    warnings
}

// ── Summaries ────────────────────────────────────────────────────────────────

/// Summarize the transition from `prior` to `current`.
///
/// Months are taken as given. A gap between them is reported, not filled.
pub fn summarize_month(prior: &MonthSnapshots, current: &MonthSnapshots) -> MonthlySummary {
    let mut warnings = validate_month(prior);
    warnings.extend(validate_month(current));

    if prior_month_start(current.month) != prior.month {
        log::warn!(
            "summary {}: prior snapshot is {}, not the preceding month",
            current.month,
            prior.month,
        );
        warnings.push(SnapshotWarning::NonAdjacentMonths {
            prior:   prior.month,
            current: current.month,
        });
    }

    let bridge = compute_mrr_bridge(&prior.members, &current.members);
    let counts = compute_member_counts(&current.members, &prior.members);
    let starting_member_count = paying_member_count(&prior.members);
    let retention = compute_retention_rates(&bridge, &counts, starting_member_count);

    let attach = current.attach.as_ref().map(|input| {
        compute_attach_metrics(
            &input.member_revenue,
            input.attach_revenue_total,
            counts.active_members,
            input.base_revenue_total,
        )
    });

    log::info!(
        "summary {}: MRR {} -> {} (net {}), active={} churned={} NRR={} GRR={}",
        current.month,
        bridge.starting_mrr,
        bridge.ending_mrr,
        bridge.net_new_mrr,
        counts.active_members,
        counts.churned_members,
        retention.nrr.round_dp(4),
        retention.grr.round_dp(4),
    );

    MonthlySummary {
        month: current.month,
        prior_month: prior.month,
        bridge,
        counts,
        starting_member_count,
        retention,
        attach,
        warnings,
    }
}

/// One summary per adjacent pair of `months`, in input order. Fewer than two
/// months yields an empty series.
pub fn summarize_series(months: &[MonthSnapshots]) -> Vec<MonthlySummary> {
    months
        .windows(2)
        .map(|pair| summarize_month(&pair[0], &pair[1]))
        .collect()
}
