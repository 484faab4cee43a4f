//! SQLite snapshot store.
//!
//! RULE: Only store.rs talks to the database.
//! The report loop asks for whole months; it never executes SQL directly.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use mrr_core::{
    calendar::MonthKey,
    snapshot::{MemberSnapshot, SubscriptionStatus, MONEY_DP},
    summary::{AttachInput, MonthSnapshots},
    types::{MemberId, Money},
};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use std::collections::HashMap;

pub struct SnapshotStore {
    conn: Connection,
}

type SnapshotRow = (
    String,
    String,
    i64,
    Option<String>,
    Option<String>,
    Option<i64>,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Amounts finer than a cent are rejected rather than rounded on write.
fn to_cents(amount: Money) -> Result<i64> {
    if amount.normalize().scale() > MONEY_DP {
        return Err(anyhow!("amount {amount} has more than {MONEY_DP} decimal places"));
    }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| anyhow!("amount {amount} does not fit in cents"))
}

fn from_cents(cents: i64) -> Money {
    Decimal::new(cents, 2)
}

impl SnapshotStore {
    /// Open (or create) the snapshot database at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Cannot open snapshot store {path}"))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and demo runs).
    pub fn in_memory() -> Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_snapshots.sql"))?;
        Ok(())
    }

    // ── Writes ─────────────────────────────────────────────────

    pub fn insert_snapshot(&self, s: &MemberSnapshot) -> Result<()> {
        let plan_amount_cents = s.plan_amount.map(to_cents).transpose()?;
        self.conn.execute(
            "INSERT OR REPLACE INTO member_snapshot (
                member_id, snapshot_month, mrr_cents, plan_name, plan_interval,
                plan_amount_cents, subscription_status, stripe_subscription_id,
                stripe_customer_id, first_paid_date
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                s.member_id,
                s.snapshot_month.to_string(),
                to_cents(s.mrr)?,
                s.plan_name,
                s.plan_interval,
                plan_amount_cents,
                s.subscription_status.as_str(),
                s.stripe_subscription_id,
                s.stripe_customer_id,
                s.first_paid_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    pub fn insert_attach_revenue(
        &self,
        member_id: Option<&str>,
        month: MonthKey,
        source: &str,
        amount: Money,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO attach_revenue (member_id, month, source, amount_cents)
             VALUES (?1, ?2, ?3, ?4)",
            params![member_id, month.to_string(), source, to_cents(amount)?],
        )?;
        Ok(())
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn snapshots_for_month(&self, month: MonthKey) -> Result<Vec<MemberSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id, snapshot_month, mrr_cents, plan_name, plan_interval,
                    plan_amount_cents, subscription_status, stripe_subscription_id,
                    stripe_customer_id, first_paid_date
             FROM member_snapshot WHERE snapshot_month = ?1
             ORDER BY member_id ASC",
        )?;
        let rows = stmt
            .query_map(params![month.to_string()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                ))
            })?
            .collect::<Result<Vec<SnapshotRow>, _>>()?;

        rows.into_iter().map(snapshot_from_row).collect()
    }

    /// Attributed attach revenue per member. Rows without a member are
    /// unattributed and left out.
    pub fn attach_revenue_for_month(&self, month: MonthKey) -> Result<HashMap<MemberId, Money>> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id, SUM(amount_cents)
             FROM attach_revenue
             WHERE month = ?1 AND member_id IS NOT NULL
             GROUP BY member_id",
        )?;
        let revenue = stmt
            .query_map(params![month.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, from_cents(row.get(1)?)))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(revenue)
    }

    /// True when neither snapshots nor attach revenue have been written.
    pub fn is_empty(&self) -> Result<bool> {
        let rows: i64 = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM member_snapshot)
                  + (SELECT COUNT(*) FROM attach_revenue)",
            [],
            |row| row.get(0),
        )?;
        Ok(rows == 0)
    }

    pub fn latest_month(&self) -> Result<Option<MonthKey>> {
        let latest: Option<String> = self
            .conn
            .query_row("SELECT MAX(snapshot_month) FROM member_snapshot", [], |row| row.get(0))
            .optional()?
            .flatten();
        Ok(latest.map(|m| m.parse::<MonthKey>()).transpose()?)
    }

    /// Everything the core needs for one month: member rows plus attach input.
    pub fn load_month(&self, month: MonthKey) -> Result<MonthSnapshots> {
        let members = self.snapshots_for_month(month)?;
        let member_revenue = self.attach_revenue_for_month(month)?;

        let attach = AttachInput {
            attach_revenue_total: checked_total(member_revenue.values().copied())
                .with_context(|| format!("attach revenue total for {month}"))?,
            base_revenue_total: checked_total(members.iter().map(MemberSnapshot::effective_mrr))
                .with_context(|| format!("base revenue total for {month}"))?,
            member_revenue,
        };

        log::debug!("store: loaded {} snapshot rows for {month}", members.len());
        Ok(MonthSnapshots::new(month, members).with_attach(attach))
    }
}

fn checked_total(amounts: impl IntoIterator<Item = Money>) -> Result<Money> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .ok_or_else(|| anyhow!("sum overflows at {total} + {amount}"))
    })
}

fn snapshot_from_row(row: SnapshotRow) -> Result<MemberSnapshot> {
    let (
        member_id,
        snapshot_month,
        mrr_cents,
        plan_name,
        plan_interval,
        plan_amount_cents,
        status,
        stripe_subscription_id,
        stripe_customer_id,
        first_paid_date,
    ) = row;

    let first_paid_date = first_paid_date
        .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("bad first_paid_date for member {member_id}"))?;

    Ok(MemberSnapshot {
        snapshot_month: snapshot_month.parse()?,
        mrr: from_cents(mrr_cents),
        plan_name,
        plan_interval,
        plan_amount: plan_amount_cents.map(from_cents),
        subscription_status: SubscriptionStatus::from(status),
        stripe_subscription_id,
        stripe_customer_id,
        first_paid_date,
        member_id,
    })
}
