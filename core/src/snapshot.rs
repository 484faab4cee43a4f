//! Member snapshots — one row per member per month, as handed over by the
//! snapshot store.
//!
//! Only `member_id`, `snapshot_month`, `mrr`, `subscription_status` and
//! `first_paid_date` feed the arithmetic. Plan and billing references are
//! carried through for drill-down rendering.

use crate::{
    calendar::MonthKey,
    types::{MemberId, Money},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decimal places every MRR amount is held to (cents).
pub const MONEY_DP: u32 = 2;

/// Largest MRR a single row may carry. Larger values are malformed and count
/// as zero, which keeps every bridge sum exact and free of overflow.
pub const MAX_MRR: Money = dec!(1000000000000);

/// Billing-source subscription status. Unknown values pass through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    Paused,
    Other(String),
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active   => "active",
            Self::Canceled => "canceled",
            Self::Paused   => "paused",
            Self::Other(s) => s,
        }
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for SubscriptionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active"   => Self::Active,
            "canceled" => Self::Canceled,
            "paused"   => Self::Paused,
            _          => Self::Other(s),
        }
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub member_id:              MemberId,
    pub snapshot_month:         MonthKey,
    #[serde(default)]
    pub mrr:                    Money,
    #[serde(default)]
    pub plan_name:              Option<String>,
    #[serde(default)]
    pub plan_interval:          Option<String>,
    #[serde(default)]
    pub plan_amount:            Option<Money>,
    #[serde(default)]
    pub subscription_status:    SubscriptionStatus,
    #[serde(default)]
    pub stripe_subscription_id: Option<String>,
    #[serde(default)]
    pub stripe_customer_id:     Option<String>,
    #[serde(default)]
    pub first_paid_date:        Option<NaiveDate>,
}

impl MemberSnapshot {
    /// A snapshot carrying only the fields the calculators read.
    pub fn new(
        member_id: impl Into<MemberId>,
        snapshot_month: MonthKey,
        mrr: Money,
        subscription_status: impl Into<SubscriptionStatus>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            snapshot_month,
            mrr,
            plan_name: None,
            plan_interval: None,
            plan_amount: None,
            subscription_status: subscription_status.into(),
            stripe_subscription_id: None,
            stripe_customer_id: None,
            first_paid_date: None,
        }
    }

    pub fn with_first_paid_date(mut self, date: NaiveDate) -> Self {
        self.first_paid_date = Some(date);
        self
    }

    /// MRR as used by every calculator, rounded to `MONEY_DP` places.
    /// Negative values and values above `MAX_MRR` are malformed and count
    /// as zero.
    pub fn effective_mrr(&self) -> Money {
        if self.mrr <= Decimal::ZERO || self.mrr > MAX_MRR {
            return Decimal::ZERO;
        }
        self.mrr.round_dp(MONEY_DP)
    }

    pub fn is_paying(&self) -> bool {
        self.effective_mrr() > Decimal::ZERO
    }

    /// True when `mrr` carries more precision than `MONEY_DP`.
    pub fn has_excess_precision(&self) -> bool {
        self.mrr.normalize().scale() > MONEY_DP
    }

    pub fn is_paused(&self) -> bool {
        self.subscription_status == SubscriptionStatus::Paused
    }

    /// True when the member's very first paid period began in `month`.
    pub fn first_paid_in(&self, month: MonthKey) -> bool {
        self.first_paid_date.is_some_and(|date| month.contains(date))
    }
}

/// Index a snapshot list by member. A later duplicate row replaces an
/// earlier one.
pub fn index_by_member(records: &[MemberSnapshot]) -> BTreeMap<&str, &MemberSnapshot> {
    let mut index = BTreeMap::new();
    for record in records {
        if index.insert(record.member_id.as_str(), record).is_some() {
            log::warn!(
                "snapshot {}: duplicate row for member {}, keeping the last",
                record.snapshot_month,
                record.member_id,
            );
        }
    }
    index
}
