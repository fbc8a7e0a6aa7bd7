//! Calendar-day helpers for metrics ranges.

use chrono::{Duration, Local, NaiveDate};

/// YYYY-MM-DD
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `None` when the result falls outside the supported calendar.
pub fn add_days(date: NaiveDate, delta: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(delta)?)
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DayRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Today only (local time).
    pub fn today() -> Self {
        let today = Local::now().date_naive();
        Self::new(today, today)
    }

    /// The last `n` days ending today, inclusive.
    pub fn last_days(n: u32) -> Option<Self> {
        Self::ending_at(Local::now().date_naive(), n)
    }

    pub fn ending_at(to: NaiveDate, n: u32) -> Option<Self> {
        let span = i64::from(n.max(1)) - 1;
        Some(Self::new(add_days(to, -span)?, to))
    }

    pub fn from_day(&self) -> String {
        to_iso_date(self.from)
    }

    pub fn to_day(&self) -> String {
        to_iso_date(self.to)
    }
}
