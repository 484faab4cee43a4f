//! mrr-report: headless MRR bridge and retention report for the venue.
//!
//! Usage:
//!   mrr-report --db venue.db --month 2024-06 --months 6
//!   mrr-report --demo --seed 7 --months 12 --json
//!
//!   --months N   number of monthly bridges (loads N+1 snapshot months)
//!   --members    list the member drill-down for the latest month

mod store;
mod synthetic;

use anyhow::{bail, Result};
use chrono::Utc;
use mrr_core::{
    alerts::{evaluate_and_log, MetricAlert},
    bridge::{member_transitions, TransitionKind},
    calendar::{month_start, months_back, MonthKey},
    config::AnalyticsConfig,
    summary::{summarize_series, MonthSnapshots, MonthlySummary},
};
use rust_decimal::Decimal;
use std::env;
use store::SnapshotStore;
use synthetic::SyntheticBook;

#[derive(serde::Serialize)]
struct Report<'a> {
    through:   MonthKey,
    summaries: &'a [MonthlySummary],
    alerts:    &'a [MetricAlert],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let demo = args.iter().any(|a| a == "--demo");
    let json = args.iter().any(|a| a == "--json");
    let show_members = args.iter().any(|a| a == "--members");
    let seed = parse_arg(&args, "--seed", 42u64);
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");

    let config = AnalyticsConfig::load(data_dir).unwrap_or_else(|e| {
        log::warn!("{e}; using built-in defaults");
        AnalyticsConfig::default()
    });
    let bridges = parse_arg(&args, "--months", config.report.window_months).max(1) as usize;

    let store = if db == ":memory:" {
        SnapshotStore::in_memory()?
    } else {
        SnapshotStore::open(db)?
    };
    store.migrate()?;

    let requested_month = string_arg(&args, "--month")
        .map(str::parse::<MonthKey>)
        .transpose()?;

    let through = if demo {
        let through = requested_month.unwrap_or_else(|| month_start(&Utc::now()));
        seed_demo_book(&store, seed, &months_back(through, bridges + 1))?;
        through
    } else {
        match requested_month.or(store.latest_month()?) {
            Some(m) => m,
            None => bail!("snapshot store {db} holds no snapshots; pass --demo for a synthetic book"),
        }
    };

    let books = months_back(through, bridges + 1)
        .into_iter()
        .map(|m| store.load_month(m))
        .collect::<Result<Vec<_>>>()?;

    let summaries = summarize_series(&books);
    let alerts: Vec<MetricAlert> = summaries
        .iter()
        .flat_map(|s| evaluate_and_log(s, &config.alerts))
        .collect();

    if json {
        let report = Report { through, summaries: &summaries, alerts: &alerts };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&summaries, &alerts);
        if show_members {
            print_members(&books);
        }
    }

    Ok(())
}

/// Write a synthetic book into an empty store. A store that already holds
/// rows is refused so real snapshots are never overwritten or mixed in.
fn seed_demo_book(store: &SnapshotStore, seed: u64, months: &[MonthKey]) -> Result<()> {
    if !store.is_empty()? {
        bail!("--demo needs an empty snapshot store; drop --db or point it at a new file");
    }
    let mut book = SyntheticBook::new(seed);
    for &month in months {
        let generated = book.next_month(month);
        for row in &generated.snapshots {
            store.insert_snapshot(row)?;
        }
        for (member_id, source, amount) in &generated.attach {
            store.insert_attach_revenue(member_id.as_deref(), month, source, *amount)?;
        }
    }
    log::info!("demo: seeded {} months from seed {seed}", months.len());
    Ok(())
}

fn pct(ratio: Decimal) -> Decimal {
    (ratio * Decimal::ONE_HUNDRED).round_dp(1)
}

fn print_report(summaries: &[MonthlySummary], alerts: &[MetricAlert]) {
    println!("=== MRR BRIDGE ===");
    if summaries.is_empty() {
        println!("  (Need at least two snapshot months)");
    }
    for s in summaries {
        let b = &s.bridge;
        println!(
            "  {} | start ${:.2} | new ${:.2} | exp ${:.2} | con ${:.2} | churn ${:.2} | pause ${:.2} | net ${:.2} | end ${:.2}",
            s.month,
            b.starting_mrr,
            b.new_mrr,
            b.expansion_mrr,
            b.contraction_mrr,
            b.churned_mrr,
            b.paused_mrr,
            b.net_new_mrr,
            b.ending_mrr,
        );
    }

    println!();
    println!("=== RETENTION ===");
    for s in summaries {
        let r = &s.retention;
        let c = &s.counts;
        println!(
            "  {} | NRR {}% | GRR {}% | logo churn {}% | revenue churn {}% | active {} new {} churned {} paused {}",
            s.month,
            pct(r.nrr),
            pct(r.grr),
            pct(r.logo_churn_rate),
            pct(r.revenue_churn_rate),
            c.active_members,
            c.new_members,
            c.churned_members,
            c.paused_members,
        );
    }

    println!();
    println!("=== ATTACH ===");
    for s in summaries {
        if let Some(a) = &s.attach {
            println!(
                "  {} | attach ${:.2} | members {} | rate {}% | all-in ARPM ${:.2}",
                s.month,
                a.attach_revenue,
                a.members_with_attach,
                pct(a.attach_rate),
                a.all_in_arpm,
            );
        }
    }

    let incomplete: Vec<_> = summaries.iter().filter(|s| !s.is_complete()).collect();
    if !incomplete.is_empty() {
        println!();
        println!("=== DATA WARNINGS ===");
        for s in incomplete {
            for w in &s.warnings {
                println!("  {} | {w:?}", s.month);
            }
        }
    }

    println!();
    println!("=== ALERTS ===");
    if alerts.is_empty() {
        println!("  (None)");
    }
    for a in alerts {
        println!(
            "  {} | {} {} vs threshold {}",
            a.month,
            a.metric.label(),
            a.value.round_dp(4),
            a.threshold,
        );
    }
}

fn print_members(books: &[MonthSnapshots]) {
    let [.., prior, current] = books else {
        return;
    };

    println!();
    println!("=== MEMBER MOVEMENT {} ===", current.month);
    for t in member_transitions(&prior.members, &current.members) {
        if t.kind() == TransitionKind::Unchanged {
            continue;
        }
        println!(
            "  {:<12} {:<12} ${:.2} -> ${:.2} ({})",
            t.member_id,
            format!("{:?}", t.kind()),
            t.prior_mrr,
            t.current_mrr,
            t.transition.amount(),
        );
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    string_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
