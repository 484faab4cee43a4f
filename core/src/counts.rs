//! Member counts — the head-count view of a month transition.

use crate::snapshot::{index_by_member, MemberSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCounts {
    pub active_members:  u64,
    pub new_members:     u64,
    pub churned_members: u64,
    pub paused_members:  u64,
}

/// Count active, new, churned and paused members for one month transition.
///
/// `new_members` looks only at `first_paid_date` against each row's own
/// snapshot month, so a member who joined and immediately lapsed still
/// counts as new.
pub fn compute_member_counts(current: &[MemberSnapshot], prior: &[MemberSnapshot]) -> MemberCounts {
    let current_index = index_by_member(current);
    let prior_index = index_by_member(prior);

    let active_members = current_index.values().filter(|s| s.is_paying()).count() as u64;

    let new_members = current_index
        .values()
        .filter(|s| s.first_paid_in(s.snapshot_month))
        .count() as u64;

    let paused_members = current_index
        .values()
        .filter(|s| !s.is_paying() && s.is_paused())
        .count() as u64;

    let churned_members = prior_index
        .iter()
        .filter(|(_, p)| p.is_paying())
        .filter(|(member_id, _)| match current_index.get(*member_id) {
            None => true,
            Some(c) => !c.is_paying() && !c.is_paused(),
        })
        .count() as u64;

    let counts = MemberCounts {
        active_members,
        new_members,
        churned_members,
        paused_members,
    };
    log::debug!("counts: {counts:?}");
    counts
}

/// Distinct members with positive MRR. The starting head count for
/// logo churn when applied to the prior snapshot.
pub fn paying_member_count(records: &[MemberSnapshot]) -> u64 {
    index_by_member(records)
        .values()
        .filter(|s| s.is_paying())
        .count() as u64
}
