use mrr_core::{
    alerts::{evaluate_alerts, evaluate_and_log, AlertMetric, AlertThresholds},
    attach::AttachMetrics,
    bridge::MrrBridge,
    calendar::MonthKey,
    counts::MemberCounts,
    retention::RetentionRates,
    summary::MonthlySummary,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn summary(nrr: Decimal, grr: Decimal, logo: Decimal, revenue: Decimal) -> MonthlySummary {
    let month: MonthKey = "2024-03".parse().unwrap();
    MonthlySummary {
        month,
        prior_month: "2024-02".parse().unwrap(),
        bridge: MrrBridge::default(),
        counts: MemberCounts::default(),
        starting_member_count: 0,
        retention: RetentionRates {
            nrr,
            grr,
            logo_churn_rate: logo,
            revenue_churn_rate: revenue,
        },
        attach: None,
        warnings: vec![],
    }
}

fn strict() -> AlertThresholds {
    AlertThresholds {
        min_nrr:                Some(dec!(1.0)),
        min_grr:                Some(dec!(0.9)),
        max_logo_churn_rate:    Some(dec!(0.05)),
        max_revenue_churn_rate: Some(dec!(0.05)),
        min_attach_rate:        Some(dec!(0.25)),
    }
}

#[test]
fn healthy_month_raises_nothing() {
    let s = summary(dec!(1.02), dec!(0.97), dec!(0.01), dec!(0.02));
    assert!(evaluate_alerts(&s, &strict()).is_empty());
}

#[test]
fn each_breached_bound_raises_one_alert() {
    let s = summary(dec!(0.8), dec!(0.7), dec!(0.2), dec!(0.15));
    let alerts = evaluate_alerts(&s, &strict());

    let metrics: Vec<AlertMetric> = alerts.iter().map(|a| a.metric).collect();
    assert_eq!(
        metrics,
        [
            AlertMetric::Nrr,
            AlertMetric::Grr,
            AlertMetric::LogoChurnRate,
            AlertMetric::RevenueChurnRate,
        ]
    );
    assert_eq!(alerts[0].value, dec!(0.8));
    assert_eq!(alerts[0].threshold, dec!(1.0));
    assert_eq!(alerts[0].month.to_string(), "2024-03-01");
}

#[test]
fn values_on_the_threshold_do_not_alert() {
    let s = summary(dec!(1.0), dec!(0.9), dec!(0.05), dec!(0.05));
    assert!(evaluate_alerts(&s, &strict()).is_empty());
}

#[test]
fn disabled_thresholds_are_skipped() {
    let s = summary(dec!(0.1), dec!(0.1), dec!(0.9), dec!(0.9));
    assert!(evaluate_alerts(&s, &AlertThresholds::default()).is_empty());
}

#[test]
fn attach_rate_checked_only_when_present() {
    let mut s = summary(dec!(1.1), dec!(1.0), dec!(0), dec!(0));
    assert!(evaluate_alerts(&s, &strict()).is_empty());

    s.attach = Some(AttachMetrics {
        attach_revenue: dec!(100),
        members_with_attach: 1,
        attach_rate: dec!(0.1),
        all_in_arpm: dec!(55),
    });
    let alerts = evaluate_and_log(&s, &strict());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].metric, AlertMetric::AttachRate);
}
