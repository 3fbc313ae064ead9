//! Calendar months addressed by `YYYY-MM` labels.

use crate::error::{ReportError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month. Ordering follows calendar time (year, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Build a period from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Resolve a `YYYY-MM` label. The first day of the month is the anchor.
    pub fn resolve(label: &str) -> Result<Self> {
        let label = label.trim();
        let invalid = || ReportError::InvalidPeriod(label.to_string());
        let (y, m) = label.split_once('-').ok_or_else(invalid)?;
        let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if y.len() != 4 || m.len() != 2 || !digits(y) || !digits(m) {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // `new` only accepts months chrono can represent
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() => 29,
            2 => 28,
            _ => 31,
        }
    }

    fn index(date: NaiveDate) -> i64 {
        date.year() as i64 * 12 + date.month0() as i64
    }

    /// Shift by a signed number of months, crossing year boundaries.
    /// Saturates at the first and last months chrono can represent.
    pub fn add(&self, offset: i32) -> Self {
        let index = (self.year as i64 * 12 + (self.month as i64 - 1) + offset as i64)
            .clamp(Self::index(NaiveDate::MIN), Self::index(NaiveDate::MAX));
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn previous(&self) -> Self {
        self.add(-1)
    }

    pub fn same_month_last_year(&self) -> Self {
        self.add(-12)
    }

    /// Format the anchor date with a chrono `strftime` pattern, e.g. `%m-%Y`.
    pub fn format(&self, pattern: &str) -> String {
        self.first_day().format(pattern).to_string()
    }

    /// `count` consecutive periods ending at `self`, oldest first.
    pub fn window(&self, count: usize) -> Vec<Self> {
        (0..count as i32).rev().map(|back| self.add(-back)).collect()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(label: &str) -> Period {
        Period::resolve(label).unwrap()
    }

    #[test]
    fn resolves_labels() {
        assert_eq!(p("2024-03"), Period::new(2024, 3).unwrap());
        assert_eq!(p(" 2024-12 ").to_string(), "2024-12");
        assert!(Period::resolve("2024-13").is_err());
        assert!(Period::resolve("2024/01").is_err());
        assert!(Period::resolve("24-01").is_err());
        assert!(Period::resolve("").is_err());
    }

    #[test]
    fn day_counts() {
        assert_eq!(p("2024-02").days_in_month(), 29);
        assert_eq!(p("2023-02").days_in_month(), 28);
        assert_eq!(p("2024-04").days_in_month(), 30);
        assert_eq!(p("2024-12").days_in_month(), 31);
        assert_eq!(p("1900-02").days_in_month(), 28);
        assert_eq!(p("2000-02").days_in_month(), 29);
    }

    #[test]
    fn shifting_saturates_at_calendar_limits() {
        let last = p("2024-06").add(i32::MAX);
        assert_eq!(last.month(), 12);
        assert_eq!(last.year(), NaiveDate::MAX.year());
        assert_eq!(last.add(1), last);
        assert_eq!(last.days_in_month(), 31);
        assert_eq!(last.first_day(), NaiveDate::from_ymd_opt(last.year(), 12, 1).unwrap());

        let first = p("2024-06").add(i32::MIN);
        assert_eq!(first.month(), 1);
        assert_eq!(first.year(), NaiveDate::MIN.year());
        assert_eq!(first.add(-1), first);
        assert_eq!(first.days_in_month(), 31);
    }

    #[test]
    fn shifting_wraps_years() {
        assert_eq!(p("2024-01").add(-1), p("2023-12"));
        assert_eq!(p("2024-01").previous(), p("2023-12"));
        assert_eq!(p("2024-05").add(-12), p("2023-05"));
        assert_eq!(p("2024-05").same_month_last_year(), p("2023-05"));
        assert_eq!(p("2023-12").add(1), p("2024-01"));
        assert_eq!(p("2024-03").add(-27), p("2021-12"));
    }

    #[test]
    fn orders_by_calendar_time() {
        assert!(p("2024-09") < p("2024-10"));
        assert!(p("2023-12") < p("2024-01"));
        let mut v = vec![p("2024-10"), p("2023-11"), p("2024-02")];
        v.sort();
        assert_eq!(v, vec![p("2023-11"), p("2024-02"), p("2024-10")]);
    }

    #[test]
    fn formats_and_windows() {
        assert_eq!(p("2024-03").format("%m-%Y"), "03-2024");
        assert_eq!(
            p("2024-02").window(3),
            vec![p("2023-12"), p("2024-01"), p("2024-02")]
        );
        assert!(p("2024-02").window(0).is_empty());
    }
}
