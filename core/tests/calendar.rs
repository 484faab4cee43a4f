use chrono::{NaiveDate, TimeZone, Utc};
use mrr_core::calendar::{month_end, month_start, months_back, next_month_start, prior_month_start, MonthKey};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn key(s: &str) -> MonthKey {
    s.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn month_start_formats_first_day() {
    let instant = Utc.with_ymd_and_hms(2024, 7, 19, 23, 59, 59).unwrap();
    assert_eq!(month_start(&instant).to_string(), "2024-07-01");
    assert_eq!(month_start(&date(2024, 1, 1)).to_string(), "2024-01-01");
}

#[test]
fn prior_month_rolls_over_year_boundary() {
    assert_eq!(prior_month_start(key("2024-01-01")), key("2023-12-01"));
    assert_eq!(prior_month_start(key("2024-03-01")), key("2024-02-01"));
    assert_eq!(next_month_start(key("2023-12-01")), key("2024-01-01"));
}

#[test]
fn month_end_handles_every_month_length() {
    assert_eq!(month_end(key("2024-01")), date(2024, 1, 31));
    assert_eq!(month_end(key("2024-04")), date(2024, 4, 30));
    assert_eq!(month_end(key("2024-02")), date(2024, 2, 29), "2024 is a leap year");
    assert_eq!(month_end(key("2023-02")), date(2023, 2, 28));
    assert_eq!(month_end(key("1900-02")), date(1900, 2, 28), "century non-leap year");
    assert_eq!(month_end(key("2000-02")), date(2000, 2, 29), "400-year leap year");
    assert_eq!(month_end(key("2023-12")), date(2023, 12, 31));
}

#[test]
fn months_back_is_ascending_and_ends_at_month() {
    let keys = months_back(key("2024-02-01"), 4);
    let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["2023-11-01", "2023-12-01", "2024-01-01", "2024-02-01"]);
}

#[test]
fn months_back_single_and_empty() {
    assert_eq!(months_back(key("2024-05"), 1), vec![key("2024-05")]);
    assert!(months_back(key("2024-05"), 0).is_empty());
}

#[test]
fn month_key_parses_and_normalizes() {
    assert_eq!(key("2024-03-17"), key("2024-03-01"));
    assert_eq!(key(" 2024-03 "), key("2024-03-01"));
    assert!("2024-13".parse::<MonthKey>().is_err());
    assert!("March 2024".parse::<MonthKey>().is_err());
}

#[test]
fn month_key_contains_only_its_own_days() {
    let march = key("2024-03");
    assert!(march.contains(date(2024, 3, 1)));
    assert!(march.contains(date(2024, 3, 31)));
    assert!(!march.contains(date(2024, 4, 1)));
    assert!(!march.contains(date(2023, 3, 15)));
}

#[test]
fn month_key_serializes_as_string() {
    let json = serde_json::to_string(&key("2024-09")).unwrap();
    assert_eq!(json, "\"2024-09-01\"");
    let back: MonthKey = serde_json::from_str("\"2024-09-01\"").unwrap();
    assert_eq!(back, key("2024-09"));
}
