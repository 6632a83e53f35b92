//! # Period Grouping
//!
//! Buckets dated records into days, ISO weeks or months and sums a value
//! per bucket.
//!
//! | Period  | Key          | Example      |
//! |---------|--------------|--------------|
//! | Daily   | `YYYY-MM-DD` | `2024-01-05` |
//! | Weekly  | `YYYY-Www`   | `2024-W01`   |
//! | Monthly | `YYYY-MM`    | `2024-01`    |
//!
//! Values are summed in whole cents, so the result does not depend on the
//! order of the records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::ValidationError;

/// Reporting granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    /// Bucket key for a date.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use comanda_core::period::Period;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
    /// assert_eq!(Period::Daily.key(date), "2024-12-30");
    /// assert_eq!(Period::Weekly.key(date), "2025-W01"); // ISO week-year
    /// assert_eq!(Period::Monthly.key(date), "2024-12");
    /// ```
    pub fn key(&self, date: NaiveDate) -> String {
        match self {
            Period::Daily => date.format("%Y-%m-%d").to_string(),
            Period::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Monthly => date.format("%Y-%m").to_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Period::Daily),
            "weekly" | "week" => Ok(Period::Weekly),
            "monthly" | "month" => Ok(Period::Monthly),
            _ => Err(ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: vec![
                    "daily".to_string(),
                    "weekly".to_string(),
                    "monthly".to_string(),
                ],
            }),
        }
    }
}

/// Per-period totals plus how many records had no usable date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodTotals {
    /// Period key → sum, rounded to cents, keys ascending.
    pub totals: BTreeMap<String, f64>,
    /// Records skipped because their date could not be read.
    pub skipped: usize,
}

/// Groups records by period and sums `value_of` per bucket.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use comanda_core::period::{group_by_period, Period};
///
/// let sales = [("2024-01-05", 100.0), ("2024-01-20", 50.0), ("2024-02-01", 30.0)];
/// let grouped = group_by_period(
///     &sales,
///     Period::Monthly,
///     |s| NaiveDate::parse_from_str(s.0, "%Y-%m-%d").ok(),
///     |s| s.1,
/// );
/// assert_eq!(grouped.totals["2024-01"], 150.0);
/// assert_eq!(grouped.totals["2024-02"], 30.0);
/// ```
pub fn group_by_period<T, D, V>(records: &[T], period: Period, date_of: D, value_of: V) -> PeriodTotals
where
    D: Fn(&T) -> Option<NaiveDate>,
    V: Fn(&T) -> f64,
{
    let mut cents: BTreeMap<String, i64> = BTreeMap::new();
    let mut skipped = 0;

    for record in records {
        match date_of(record) {
            Some(date) => {
                *cents.entry(period.key(date)).or_insert(0) +=
                    Money::from_decimal(value_of(record)).cents();
            }
            None => skipped += 1,
        }
    }

    PeriodTotals {
        totals: cents
            .into_iter()
            .map(|(key, sum)| (key, Money::from_cents(sum).to_decimal()))
            .collect(),
        skipped,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
    }

    #[test]
    fn test_parse_period_names() {
        assert_eq!("daily".parse::<Period>().unwrap(), Period::Daily);
        assert_eq!("Week".parse::<Period>().unwrap(), Period::Weekly);
        assert_eq!(" month ".parse::<Period>().unwrap(), Period::Monthly);
        assert!(matches!(
            "yearly".parse::<Period>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_weekly_keys_use_iso_weeks() {
        let key = |s: &str| Period::Weekly.key(date(s).unwrap());
        assert_eq!(key("2024-01-01"), "2024-W01");
        assert_eq!(key("2024-01-07"), "2024-W01");
        assert_eq!(key("2024-01-08"), "2024-W02");
        assert_eq!(key("2021-01-03"), "2020-W53");
    }

    #[test]
    fn test_skips_unreadable_dates() {
        let records = [("2024-01-05", 10.0), ("garbage", 99.0), ("2024-01-06", 2.5)];
        let grouped = group_by_period(&records, Period::Daily, |r| date(r.0), |r| r.1);

        assert_eq!(grouped.skipped, 1);
        assert_eq!(grouped.totals.len(), 2);
        let keys: Vec<&String> = grouped.totals.keys().collect();
        assert_eq!(keys, vec!["2024-01-05", "2024-01-06"]);
    }

    #[test]
    fn test_sums_are_rounded_to_cents() {
        let records = [("2024-01-05", 0.1), ("2024-01-05", 0.2)];
        let grouped = group_by_period(&records, Period::Monthly, |r| date(r.0), |r| r.1);
        assert_eq!(grouped.totals["2024-01"], 0.3);
    }

    #[test]
    fn test_empty_input() {
        let records: [(&str, f64); 0] = [];
        let grouped = group_by_period(&records, Period::Weekly, |r| date(r.0), |r| r.1);
        assert!(grouped.totals.is_empty());
        assert_eq!(grouped.skipped, 0);
    }
}
