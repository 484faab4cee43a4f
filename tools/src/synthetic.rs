//! Synthetic venue book — a seeded, reproducible membership history used by
//! `--demo` runs.
//!
//! RULE: all randomness flows from the single seed passed to
//! `SyntheticBook::new`. The same seed and months always produce the same
//! snapshot rows, so demo reports are reproducible.

use chrono::{Datelike, Days, NaiveDate};
use mrr_core::{
    calendar::{month_end, MonthKey},
    snapshot::{MemberSnapshot, SubscriptionStatus},
    types::{MemberId, Money},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use rust_decimal::Decimal;

struct Plan {
    name:     &'static str,
    interval: &'static str,
    /// Monthly price in whole currency units.
    monthly:  i64,
}

const PLANS: [Plan; 4] = [
    Plan { name: "Off-Peak",  interval: "month", monthly: 59 },
    Plan { name: "Core",      interval: "month", monthly: 99 },
    Plan { name: "Unlimited", interval: "month", monthly: 149 },
    Plan { name: "Founders",  interval: "year",  monthly: 125 },
];

const ATTACH_SOURCES: [&str; 4] = ["guest_pass", "class_pack", "locker", "merch"];

// Monthly probabilities per member.
const P_CANCEL:     f64 = 0.04;
const P_PAUSE:      f64 = 0.02;
const P_RESUME:     f64 = 0.35;
const P_WIN_BACK:   f64 = 0.05;
const P_UPGRADE:    f64 = 0.03;
const P_DOWNGRADE:  f64 = 0.03;
const P_ATTACH:     f64 = 0.30;
const P_UNATTRIBUTED: f64 = 0.50;

struct Member {
    id:         MemberId,
    plan:       usize,
    status:     SubscriptionStatus,
    first_paid: NaiveDate,
}

/// One month of generated rows.
pub struct SyntheticMonth {
    pub snapshots: Vec<MemberSnapshot>,
    /// `None` member = unattributed revenue.
    pub attach:    Vec<(Option<MemberId>, &'static str, Money)>,
}

pub struct SyntheticBook {
    rng:     Pcg64Mcg,
    members: Vec<Member>,
    joined:  u64,
}

impl SyntheticBook {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
            members: Vec::new(),
            joined: 0,
        }
    }

    fn random_day(&mut self, month: MonthKey) -> NaiveDate {
        let last = month_end(month);
        month.first_day() + Days::new(self.rng.gen_range(0..=u64::from(last.day0())))
    }

    fn evolve_existing(&mut self) {
        for i in 0..self.members.len() {
            let roll: f64 = self.rng.gen();
            let member = &mut self.members[i];

            let next = match member.status {
                SubscriptionStatus::Active if roll < P_CANCEL => Some(SubscriptionStatus::Canceled),
                SubscriptionStatus::Active if roll < P_CANCEL + P_PAUSE => Some(SubscriptionStatus::Paused),
                SubscriptionStatus::Paused if roll < P_RESUME => Some(SubscriptionStatus::Active),
                SubscriptionStatus::Canceled if roll < P_WIN_BACK => Some(SubscriptionStatus::Active),
                _ => None,
            };
            if let Some(status) = next {
                member.status = status;
            }

            if member.status == SubscriptionStatus::Active {
                let shift: f64 = self.rng.gen();
                if shift < P_UPGRADE && member.plan + 1 < PLANS.len() {
                    member.plan += 1;
                } else if shift < P_UPGRADE + P_DOWNGRADE && member.plan > 0 {
                    member.plan -= 1;
                }
            }
        }
    }

    fn onboard(&mut self, month: MonthKey) {
        let joiners = self.rng.gen_range(2..=6);
        for _ in 0..joiners {
            self.joined += 1;
            let first_paid = self.random_day(month);
            let plan = self.rng.gen_range(0..PLANS.len());
            self.members.push(Member {
                id: format!("mem_{:05}", self.joined),
                plan,
                status: SubscriptionStatus::Active,
                first_paid,
            });
        }
    }

    /// Advance the book into `month` and return that month's rows.
    pub fn next_month(&mut self, month: MonthKey) -> SyntheticMonth {
        self.evolve_existing();
        self.onboard(month);

        let snapshots: Vec<MemberSnapshot> = self
            .members
            .iter()
            .map(|m| {
                let plan = &PLANS[m.plan];
                let price = Decimal::from(plan.monthly);
                let mrr = if m.status == SubscriptionStatus::Active { price } else { Decimal::ZERO };

                let mut row = MemberSnapshot::new(m.id.clone(), month, mrr, m.status.clone())
                    .with_first_paid_date(m.first_paid);
                row.plan_name = Some(plan.name.to_string());
                row.plan_interval = Some(plan.interval.to_string());
                row.plan_amount = Some(price);
                row
            })
            .collect();

        let mut attach = Vec::new();
        for row in snapshots.iter().filter(|s| s.is_paying()) {
            if self.rng.gen_bool(P_ATTACH) {
                let source = ATTACH_SOURCES[self.rng.gen_range(0..ATTACH_SOURCES.len())];
                let amount = Decimal::new(self.rng.gen_range(500..=6000), 2);
                attach.push((Some(row.member_id.clone()), source, amount));
            }
        }
        if self.rng.gen_bool(P_UNATTRIBUTED) {
            attach.push((None, "walk_in", Decimal::new(self.rng.gen_range(1000..=4000), 2)));
        }

        log::debug!(
            "synthetic {month}: {} rows, {} attach purchases",
            snapshots.len(),
            attach.len()
        );

        SyntheticMonth { snapshots, attach }
    }
}
