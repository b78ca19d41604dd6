//! Timestamp to calendar-day normalization.
//!
//! Historical daily data is timezone-agnostic. A timestamp such as
//! `2020-03-01T00:00:00Z` names the day 2020-03-01 regardless of where the
//! dashboard runs, so the UTC calendar fields are kept as-is and the day is
//! re-anchored at local midnight only when an instant is needed for display.

use crate::error::{Result, TrendError};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use core::mem::replace;

/// Date format used for bare calendar days: "YYYY-MM-DD"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Naive timestamp formats, read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Convert an ISO-8601 timestamp into the calendar day named by its UTC
/// year, month and day.
///
/// Timestamps with an offset are shifted to UTC first. Naive timestamps and
/// bare dates are taken as UTC. Anything else is `TrendError::InvalidDate`;
/// callers drop such points instead of aborting.
pub fn normalize_timestamp(timestamp: &str) -> Result<NaiveDate> {
    let trimmed = timestamp.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(with_offset.with_timezone(&Utc).date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.date());
        }
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| TrendError::InvalidDate(timestamp.to_string()))
}

/// A calendar day that can be placed on a local-time axis.
pub trait CalendarDay {
    /// The instant of local midnight on this day.
    ///
    /// Returns `None` only when midnight does not exist locally (a DST gap
    /// at 00:00); the earliest valid reading is used when midnight is
    /// ambiguous.
    fn local_midnight(&self) -> Option<DateTime<Local>>;
}

impl CalendarDay for NaiveDate {
    fn local_midnight(&self) -> Option<DateTime<Local>> {
        let midnight = self.and_hms_opt(0, 0, 0)?;
        Local.from_local_datetime(&midnight).earliest()
    }
}

/// An iterator over `count` dates spaced `step` days apart, starting one
/// step after `after`.
///
/// Stops early instead of panicking if the calendar range overflows.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateStride {
    next: Option<NaiveDate>,
    step: TimeDelta,
    remaining: usize,
}

impl DateStride {
    pub fn new(after: NaiveDate, step_days: i64, count: usize) -> Self {
        let step = TimeDelta::days(step_days);
        Self {
            next: after.checked_add_signed(step),
            step,
            remaining: count,
        }
    }
}

impl Iterator for DateStride {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        let following = current.checked_add_signed(self.step);
        replace(&mut self.next, following)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (0, Some(self.remaining)),
            None => (0, Some(0)),
        }
    }
}
