use chrono::NaiveDate;
use mrr_core::{
    calendar::MonthKey,
    counts::{compute_member_counts, paying_member_count, MemberCounts},
    snapshot::MemberSnapshot,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn feb() -> MonthKey {
    MonthKey::from_ym(2024, 2).unwrap()
}

fn mar() -> MonthKey {
    MonthKey::from_ym(2024, 3).unwrap()
}

fn row(id: &str, month: MonthKey, mrr: Decimal, status: &str) -> MemberSnapshot {
    MemberSnapshot::new(id, month, mrr, status)
        .with_first_paid_date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())
}

fn joined_in_march(id: &str, mrr: Decimal, status: &str) -> MemberSnapshot {
    MemberSnapshot::new(id, mar(), mrr, status)
        .with_first_paid_date(NaiveDate::from_ymd_opt(2024, 3, 28).unwrap())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn counts_for_worked_example() {
    let prior = vec![
        row("m1", feb(), dec!(100), "active"),
        row("m2", feb(), dec!(200), "active"),
        row("m3", feb(), dec!(150), "active"),
        row("m4", feb(), dec!(80), "active"),
        row("m5", feb(), dec!(100), "active"),
    ];
    let current = vec![
        row("m1", mar(), dec!(130), "active"),
        row("m2", mar(), dec!(150), "active"),
        row("m3", mar(), dec!(0), "canceled"),
        row("m4", mar(), dec!(0), "paused"),
        row("m5", mar(), dec!(100), "active"),
        joined_in_march("m6", dec!(90), "active"),
    ];

    let counts = compute_member_counts(&current, &prior);
    assert_eq!(
        counts,
        MemberCounts {
            active_members:  4,
            new_members:     1,
            churned_members: 1,
            paused_members:  1,
        }
    );
}

#[test]
fn empty_snapshots_count_nothing() {
    assert_eq!(compute_member_counts(&[], &[]), MemberCounts::default());
}

#[test]
fn member_absent_from_current_is_churned() {
    let prior = [row("gone", feb(), dec!(55), "active")];
    let counts = compute_member_counts(&[], &prior);
    assert_eq!(counts.churned_members, 1);
    assert_eq!(counts.paused_members, 0);
}

#[test]
fn paused_and_still_active_members_never_churn() {
    let prior = [
        row("p", feb(), dec!(70), "active"),
        row("a", feb(), dec!(70), "active"),
    ];
    let current = [
        row("p", mar(), dec!(0), "paused"),
        row("a", mar(), dec!(70), "canceled"),
    ];

    let counts = compute_member_counts(&current, &prior);
    assert_eq!(counts.churned_members, 0, "paid-through cancellation is still active");
    assert_eq!(counts.paused_members, 1);
    assert_eq!(counts.active_members, 1);
}

#[test]
fn zero_mrr_prior_member_cannot_churn() {
    let prior = [row("lapsed", feb(), dec!(0), "canceled")];
    let counts = compute_member_counts(&[], &prior);
    assert_eq!(counts.churned_members, 0);
}

#[test]
fn new_member_counted_even_without_revenue() {
    let current = [joined_in_march("trial", dec!(0), "canceled")];
    let counts = compute_member_counts(&current, &[]);
    assert_eq!(counts.new_members, 1);
    assert_eq!(counts.active_members, 0);
}

#[test]
fn paused_member_with_revenue_is_active_not_paused() {
    let current = [row("m1", mar(), dec!(20), "paused")];
    let counts = compute_member_counts(&current, &[]);
    assert_eq!(counts.active_members, 1);
    assert_eq!(counts.paused_members, 0);
}

#[test]
fn paying_member_count_ignores_zero_and_duplicates() {
    let rows = [
        row("m1", feb(), dec!(10), "active"),
        row("m1", feb(), dec!(10), "active"),
        row("m2", feb(), dec!(0), "canceled"),
        row("m3", feb(), dec!(35), "active"),
    ];
    assert_eq!(paying_member_count(&rows), 2);
}
