//! MRR bridge — reconciles how recurring revenue moved between two monthly
//! snapshots.
//!
//! Every member present in either snapshot is classified by
//! `classify_transition` into exactly one `Transition`. The bridge is the
//! fold of those transitions, so it always satisfies:
//!
//!   ending_mrr  == starting_mrr + net_new_mrr
//!   net_new_mrr == new + expansion - contraction - churned - paused
//!
//! Every row's MRR enters at cent scale and below `MAX_MRR` (see
//! `MemberSnapshot::effective_mrr`), so the `Decimal` sums never round or
//! overflow and both identities hold exactly.
//!
//! Reactivations (paid before, lapsed, paying again) are booked as
//! expansion rather than new business.

use crate::{
    snapshot::{index_by_member, MemberSnapshot},
    types::{MemberId, Money},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MrrBridge {
    pub starting_mrr:    Money,
    pub ending_mrr:      Money,
    pub new_mrr:         Money,
    pub expansion_mrr:   Money,
    pub contraction_mrr: Money,
    pub churned_mrr:     Money,
    pub paused_mrr:      Money,
    /// May be negative.
    pub net_new_mrr:     Money,
}

impl MrrBridge {
    /// True when both bridge identities hold.
    pub fn reconciles(&self) -> bool {
        let components = self.new_mrr + self.expansion_mrr
            - self.contraction_mrr
            - self.churned_mrr
            - self.paused_mrr;
        self.net_new_mrr == components && self.ending_mrr == self.starting_mrr + self.net_new_mrr
    }

    fn from_transitions(transitions: &[MemberTransition]) -> Self {
        let mut bridge = Self::default();

        for t in transitions {
            bridge.starting_mrr += t.prior_mrr;
            bridge.ending_mrr += t.current_mrr;

            match t.transition {
                Transition::New(amount) => bridge.new_mrr += amount,
                Transition::Reactivation(amount)
                | Transition::Expansion(amount) => bridge.expansion_mrr += amount,
                Transition::Contraction(amount) => bridge.contraction_mrr += amount,
                Transition::Churn(amount) => bridge.churned_mrr += amount,
                Transition::Pause(amount) => bridge.paused_mrr += amount,
                Transition::Unchanged => {}
            }
        }

        bridge.net_new_mrr = bridge.new_mrr + bridge.expansion_mrr
            - bridge.contraction_mrr
            - bridge.churned_mrr
            - bridge.paused_mrr;
        bridge
    }
}

/// How one member's MRR moved between the two snapshots. The amount is the
/// (non-negative) contribution to the matching bridge component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Transition {
    New(Money),
    Reactivation(Money),
    Expansion(Money),
    Contraction(Money),
    Churn(Money),
    Pause(Money),
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    New,
    Reactivation,
    Expansion,
    Contraction,
    Churn,
    Pause,
    Unchanged,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::New(_)          => TransitionKind::New,
            Self::Reactivation(_) => TransitionKind::Reactivation,
            Self::Expansion(_)    => TransitionKind::Expansion,
            Self::Contraction(_)  => TransitionKind::Contraction,
            Self::Churn(_)        => TransitionKind::Churn,
            Self::Pause(_)        => TransitionKind::Pause,
            Self::Unchanged       => TransitionKind::Unchanged,
        }
    }

    pub fn amount(&self) -> Money {
        match *self {
            Self::New(a)
            | Self::Reactivation(a)
            | Self::Expansion(a)
            | Self::Contraction(a)
            | Self::Churn(a)
            | Self::Pause(a) => a,
            Self::Unchanged => Decimal::ZERO,
        }
    }
}

/// One drill-down row: a member and how their MRR moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTransition {
    pub member_id:   MemberId,
    pub prior_mrr:   Money,
    pub current_mrr: Money,
    pub transition:  Transition,
}

impl MemberTransition {
    pub fn kind(&self) -> TransitionKind {
        self.transition.kind()
    }
}

// ── Classification ───────────────────────────────────────────────────────────

/// Classify one member given their prior and current rows (either may be
/// absent).
///
/// A prior row with zero MRR is treated the same as no prior row. A member
/// missing from the current snapshot has no status to inspect and churns.
pub fn classify_transition(
    prior: Option<&MemberSnapshot>,
    current: Option<&MemberSnapshot>,
) -> Transition {
    let prior_mrr = prior.map_or(Decimal::ZERO, MemberSnapshot::effective_mrr);
    let current_mrr = current.map_or(Decimal::ZERO, MemberSnapshot::effective_mrr);

    if prior_mrr == current_mrr {
        return Transition::Unchanged;
    }

    if prior_mrr.is_zero() {
        // current_mrr > 0, so the current row exists
        let first_paid_this_month = current.is_some_and(|c| c.first_paid_in(c.snapshot_month));
        return if first_paid_this_month {
            Transition::New(current_mrr)
        } else {
            Transition::Reactivation(current_mrr)
        };
    }

    if current_mrr > prior_mrr {
        Transition::Expansion(current_mrr - prior_mrr)
    } else if current_mrr > Decimal::ZERO {
        Transition::Contraction(prior_mrr - current_mrr)
    } else if current.is_some_and(MemberSnapshot::is_paused) {
        Transition::Pause(prior_mrr)
    } else {
        Transition::Churn(prior_mrr)
    }
}

/// Classify every member in the union of both snapshots, ordered by member id.
pub fn member_transitions(
    prior: &[MemberSnapshot],
    current: &[MemberSnapshot],
) -> Vec<MemberTransition> {
    let prior_index = index_by_member(prior);
    let current_index = index_by_member(current);

    let members: BTreeSet<&str> = prior_index
        .keys()
        .chain(current_index.keys())
        .copied()
        .collect();

    members
        .into_iter()
        .map(|member_id| {
            let p = prior_index.get(member_id).copied();
            let c = current_index.get(member_id).copied();
            MemberTransition {
                member_id:   member_id.to_string(),
                prior_mrr:   p.map_or(Decimal::ZERO, MemberSnapshot::effective_mrr),
                current_mrr: c.map_or(Decimal::ZERO, MemberSnapshot::effective_mrr),
                transition:  classify_transition(p, c),
            }
        })
        .collect()
}

/// Build the MRR bridge for one month transition.
pub fn compute_mrr_bridge(prior: &[MemberSnapshot], current: &[MemberSnapshot]) -> MrrBridge {
    let transitions = member_transitions(prior, current);
    let bridge = MrrBridge::from_transitions(&transitions);

    log::debug!(
        "bridge: start={} end={} new={} exp={} con={} churn={} pause={} net={}",
        bridge.starting_mrr,
        bridge.ending_mrr,
        bridge.new_mrr,
        bridge.expansion_mrr,
        bridge.contraction_mrr,
        bridge.churned_mrr,
        bridge.paused_mrr,
        bridge.net_new_mrr,
    );

    bridge
}
