//! Calendar utilities — month-boundary arithmetic on `YYYY-MM-01` keys.
//!
//! Every other module keys its data by `MonthKey`. Nothing in here reads
//! the wall clock: a caller that wants "this month" passes its own instant
//! to `month_start`.

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The first calendar day of a month. Renders as `YYYY-MM-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// Key for a calendar year and month (1–12). `None` when out of range.
    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// True when `date` falls inside this calendar month.
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.0.year() && date.month() == self.0.month()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-01"))
    }
}

impl FromStr for MonthKey {
    type Err = AnalyticsError;

    /// Accepts `YYYY-MM` or any `YYYY-MM-DD` date, normalized to its month.
    fn from_str(s: &str) -> AnalyticsResult<Self> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d"))
            .map(|date| month_start(&date))
            .map_err(|_| AnalyticsError::InvalidMonthKey { input: s.to_string() })
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for MonthKey {
    type Error = AnalyticsError;

    fn try_from(s: String) -> AnalyticsResult<Self> {
        s.parse()
    }
}

// chrono only rejects years beyond ±262,143, far outside any snapshot.
fn first_of(year: i32, month: u32) -> MonthKey {
    MonthKey::from_ym(year, month).expect("month start outside chrono's date range")
}

/// First day of the calendar month containing `instant`.
pub fn month_start<D: Datelike>(instant: &D) -> MonthKey {
    first_of(instant.year(), instant.month())
}

/// The month immediately before `month`. January rolls back to December.
pub fn prior_month_start(month: MonthKey) -> MonthKey {
    match month.month() {
        1 => first_of(month.year() - 1, 12),
        m => first_of(month.year(), m - 1),
    }
}

/// The month immediately after `month`. December rolls over to January.
pub fn next_month_start(month: MonthKey) -> MonthKey {
    match month.month() {
        12 => first_of(month.year() + 1, 1),
        m => first_of(month.year(), m + 1),
    }
}

/// Last calendar day of `month` (28, 29, 30 or 31).
pub fn month_end(month: MonthKey) -> NaiveDate {
    next_month_start(month).first_day() - Days::new(1)
}

/// `n` month keys in ascending order, the last one being `month`.
pub fn months_back(month: MonthKey, n: usize) -> Vec<MonthKey> {
    let mut keys: Vec<MonthKey> =
        std::iter::successors(Some(month), |m| Some(prior_month_start(*m)))
            .take(n)
            .collect();
    keys.reverse();
    keys
}
