//! The validated date window a report covers.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::ReportError;

/// An inclusive start/end calendar-date range.
///
/// Only constructible through [`DateWindow::parse`], so a value in hand is
/// always ordered and within the configured span maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Parse and validate two raw `YYYY-MM-DD` strings.
    ///
    /// Rejects malformed input, reversed ranges, and inclusive spans longer
    /// than `max_days`.
    pub fn parse(raw_start: &str, raw_end: &str, max_days: i64) -> Result<Self, ReportError> {
        let start = parse_calendar_date(raw_start)?;
        let end = parse_calendar_date(raw_end)?;

        if start > end {
            return Err(ReportError::InvalidRange { start, end });
        }

        let days = (end - start).num_days() + 1;
        if days > max_days {
            return Err(ReportError::WindowTooLarge {
                days,
                max: max_days,
            });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive span in days.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// First instant of the window: `00:00:00Z` on the start day.
    pub fn start_instant(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN))
    }

    /// Last instant of the window: `23:59:59Z` on the end day.
    pub fn end_instant(&self) -> DateTime<Utc> {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        Utc.from_utc_datetime(&self.end.and_time(end_of_day))
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// The regex anchor is needed because chrono alone accepts unpadded fields
/// like `2025-1-1`.
fn parse_calendar_date(raw: &str) -> Result<NaiveDate, ReportError> {
    let shape = regex_lite::Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    if !shape.is_match(raw) {
        return Err(ReportError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDate(raw.to_string()))
}
