//! Expiration descriptors decoded from expiration control labels

use crate::error::{ChainError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const LABEL_DATE_FORMAT: &str = "%b %d, %Y";

/// One expiration offered by the chain view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpirationDescriptor {
    /// Calendar date of the expiration
    pub date: NaiveDate,
    /// Day count shown next to the date on the control
    pub days_to_expiration: u32,
    /// `days_to_expiration / trading days per year`, 4 decimals
    pub year_fraction: f64,
}

impl ExpirationDescriptor {
    pub fn new(date: NaiveDate, days_to_expiration: u32, trading_days_per_year: u32) -> Self {
        let year_fraction = round4(days_to_expiration as f64 / trading_days_per_year as f64);
        Self {
            date,
            days_to_expiration,
            year_fraction,
        }
    }

    /// Parse a label of the form `"Sep 29, 2025 (12)"`
    pub fn parse(label: &str, trading_days_per_year: u32) -> Result<Self> {
        let tokens: Vec<&str> = label.split_whitespace().collect();
        if tokens.len() != 4 {
            return Err(ChainError::ParseError(format!(
                "expected '<Mon> <Day>, <Year> (<N>)', got '{}'",
                label
            )));
        }

        let date_str = tokens[..3].join(" ");
        let date = NaiveDate::parse_from_str(&date_str, LABEL_DATE_FORMAT).map_err(|e| {
            ChainError::ParseError(format!("invalid expiration date '{}': {}", date_str, e))
        })?;

        let count = tokens[3]
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .ok_or_else(|| {
                ChainError::ParseError(format!("missing parenthesized day count in '{}'", label))
            })?;
        let days_to_expiration = count.parse::<u32>().map_err(|_| {
            ChainError::ParseError(format!("day count '{}' is not a non-negative integer", count))
        })?;

        Ok(Self::new(date, days_to_expiration, trading_days_per_year))
    }

    /// ISO `YYYY-MM-DD` form used in the persisted table
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for ExpirationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | DTE={} | YTE={}",
            self.iso_date(),
            self.days_to_expiration,
            self.year_fraction
        )
    }
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_label() {
        let d = ExpirationDescriptor::parse("Sep 29, 2025 (12)", 252).unwrap();
        assert_eq!(d.date, NaiveDate::from_ymd_opt(2025, 9, 29).unwrap());
        assert_eq!(d.days_to_expiration, 12);
        assert_eq!(d.year_fraction, round4(12.0 / 252.0));
        assert_eq!(d.year_fraction, 0.0476);
        assert_eq!(d.iso_date(), "2025-09-29");
    }

    #[test]
    fn year_fraction_matches_rounded_ratio_for_many_counts() {
        for dte in [0u32, 1, 5, 30, 63, 126, 251, 252, 400, 1000] {
            let label = format!("Mar 3, 2027 ({})", dte);
            let d = ExpirationDescriptor::parse(&label, 252).unwrap();
            let expected = ((dte as f64 / 252.0) * 10_000.0).round() / 10_000.0;
            assert_eq!(d.year_fraction, expected, "dte {}", dte);
        }
    }

    #[test]
    fn zero_days_is_valid() {
        let d = ExpirationDescriptor::parse("Jan 2, 2026 (0)", 252).unwrap();
        assert_eq!(d.days_to_expiration, 0);
        assert_eq!(d.year_fraction, 0.0);
    }

    #[test]
    fn rejects_wrong_token_count() {
        assert!(ExpirationDescriptor::parse("Sep 29, 2025", 252).is_err());
        assert!(ExpirationDescriptor::parse("Sep 29, 2025 (12) weekly", 252).is_err());
        assert!(ExpirationDescriptor::parse("", 252).is_err());
    }

    #[test]
    fn rejects_unknown_month() {
        assert!(ExpirationDescriptor::parse("Foo 29, 2025 (12)", 252).is_err());
    }

    #[test]
    fn rejects_impossible_calendar_date() {
        assert!(ExpirationDescriptor::parse("Feb 30, 2025 (12)", 252).is_err());
    }

    #[test]
    fn rejects_bad_day_count() {
        assert!(ExpirationDescriptor::parse("Sep 29, 2025 (abc)", 252).is_err());
        assert!(ExpirationDescriptor::parse("Sep 29, 2025 (-3)", 252).is_err());
        assert!(ExpirationDescriptor::parse("Sep 29, 2025 (1.5)", 252).is_err());
        assert!(ExpirationDescriptor::parse("Sep 29, 2025 12", 252).is_err());
    }

    #[test]
    fn later_expirations_have_larger_year_fractions() {
        let near = ExpirationDescriptor::parse("Oct 3, 2025 (5)", 252).unwrap();
        let far = ExpirationDescriptor::parse("Dec 26, 2025 (89)", 252).unwrap();
        assert!(near.date < far.date);
        assert!(near.year_fraction <= far.year_fraction);
    }
}
