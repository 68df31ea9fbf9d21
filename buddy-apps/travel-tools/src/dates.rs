//!  Travel Buddy Tools
//!
//!  Copyright (C) 2026  Travel Buddy Contributors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Travel date validation and the local clock reading.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Parses a `YYYY-MM-DD` travel date.
///
/// Dates in a past year are moved to `today`'s year, keeping month and day,
/// since callers often send stale years. Feb 29 becomes Feb 28 when needed.
pub fn parse_travel_date(raw: &str, label: &str, today: NaiveDate) -> Result<NaiveDate> {
    let raw = raw.trim();
    if !DATE_RE.is_match(raw) {
        bail!("Invalid {} date format: Must be YYYY-MM-DD.", label);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .with_context(|| format!("Invalid {} date: Unable to parse date.", label))?;

    if date.year() >= today.year() {
        return Ok(date);
    }

    let adjusted = date
        .with_year(today.year())
        .or_else(|| NaiveDate::from_ymd_opt(today.year(), date.month(), 28))
        .with_context(|| format!("Invalid {} date: Unable to parse date.", label))?;
    tracing::info!(
        "Adjusted {} date from {} to {} (current year)",
        label,
        date,
        adjusted
    );
    Ok(adjusted)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentDate {
    pub date: String,
    pub time: String,
    pub timezone: String,
}

pub fn current_date() -> CurrentDate {
    describe_instant(&Local::now())
}

pub fn describe_instant<Tz: TimeZone>(now: &DateTime<Tz>) -> CurrentDate
where
    Tz::Offset: Display,
{
    CurrentDate {
        date: now.format("%Y-%m-%d").to_string(),
        time: now.format("%H:%M:%S").to_string(),
        timezone: now.format("%Z").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_valid_date_unchanged() {
        let d = parse_travel_date("2026-06-01", "check-in", today()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        let d = parse_travel_date("2027-01-15", "check-in", today()).unwrap();
        assert_eq!(d.year(), 2027);
    }

    #[test]
    fn test_past_year_moves_to_current_year() {
        let d = parse_travel_date("2023-06-01", "departure", today()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
    }

    #[test]
    fn test_leap_day_falls_back() {
        let d = parse_travel_date("2024-02-29", "check-out", today()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn test_bad_format_message() {
        let err = parse_travel_date("06/01/2026", "check-in", today()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid check-in date format: Must be YYYY-MM-DD.");
        let err = parse_travel_date("2026-13-45", "check-out", today()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid check-out date: Unable to parse date.");
    }

    #[test]
    fn test_describe_instant_shapes() {
        let utc = Utc.with_ymd_and_hms(2026, 5, 4, 7, 8, 9).unwrap();
        let cd = describe_instant(&utc);
        assert_eq!(cd.date, "2026-05-04");
        assert_eq!(cd.time, "07:08:09");
        assert_eq!(cd.timezone, "UTC");

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2026, 12, 31, 23, 59, 0).unwrap();
        let cd = describe_instant(&local);
        assert_eq!(cd.date, "2026-12-31");
        assert_eq!(cd.time, "23:59:00");
        assert!(cd.timezone.contains("02:00"), "{}", cd.timezone);
    }

    #[test]
    fn test_current_date_is_well_formed() {
        let cd = current_date();
        assert!(DATE_RE.is_match(&cd.date));
        assert!(NaiveDate::parse_from_str(&cd.date, "%Y-%m-%d").is_ok());
        assert_eq!(cd.time.len(), 8);
        assert!(!cd.timezone.is_empty());
    }
}
