//! Reporting Periods
//!
//! Half-open time windows `[from, to)` with an equal-length predecessor
//! for period-over-period comparison.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::shared::error::{PlatformError, Result};

/// A half-open reporting window `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Period {
    /// The trailing `days` window ending at `now`
    pub fn last_days(days: i64, now: DateTime<Utc>) -> Self {
        Self {
            from: now - Duration::days(days),
            to: now,
        }
    }

    /// From the first instant of the current calendar month until `now`
    pub fn this_month(now: DateTime<Utc>) -> Self {
        let from = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self { from, to: now }
    }

    /// The equal-length window immediately before this one
    pub fn previous(&self) -> Self {
        let length = self.to - self.from;
        Self {
            from: self.from - length,
            to: self.from,
        }
    }

    /// Whether a timestamp falls inside the window
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at < self.to
    }

    /// Parse a dashboard period selector: "30d", "90d", or "month"
    pub fn parse(selector: &str, now: DateTime<Utc>) -> Result<Self> {
        match selector {
            "30d" => Ok(Self::last_days(30, now)),
            "90d" => Ok(Self::last_days(90, now)),
            "month" => Ok(Self::this_month(now)),
            other => Err(PlatformError::validation(format!(
                "Invalid period: {}. Valid options: 30d, 90d, month", other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_last_days_window() {
        let now = at("2026-08-06T12:00:00Z");
        let period = Period::last_days(30, now);
        assert_eq!(period.to, now);
        assert_eq!(period.from, at("2026-07-07T12:00:00Z"));
    }

    #[test]
    fn test_previous_is_equal_length_and_adjacent() {
        let now = at("2026-08-06T12:00:00Z");
        let period = Period::last_days(30, now);
        let previous = period.previous();

        assert_eq!(previous.to, period.from);
        assert_eq!(period.to - period.from, previous.to - previous.from);
    }

    #[test]
    fn test_this_month_starts_on_the_first() {
        let now = at("2026-08-06T12:00:00Z");
        let period = Period::this_month(now);
        assert_eq!(period.from, at("2026-08-01T00:00:00Z"));
        assert_eq!(period.to, now);
    }

    #[test]
    fn test_contains_half_open() {
        let period = Period {
            from: at("2026-08-01T00:00:00Z"),
            to: at("2026-08-06T00:00:00Z"),
        };
        assert!(period.contains(at("2026-08-01T00:00:00Z")));
        assert!(period.contains(at("2026-08-05T23:59:59Z")));
        assert!(!period.contains(at("2026-08-06T00:00:00Z")));
    }

    #[test]
    fn test_parse_selectors() {
        let now = at("2026-08-06T12:00:00Z");
        assert!(Period::parse("30d", now).is_ok());
        assert!(Period::parse("90d", now).is_ok());
        assert!(Period::parse("month", now).is_ok());
        assert!(Period::parse("7w", now).is_err());
    }
}
