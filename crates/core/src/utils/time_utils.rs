use chrono::{Datelike, NaiveDate};

use crate::errors::{Result, ValidationError};

/// Canonical format used for every persisted date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day-first format still found in older price imports.
pub const LEGACY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a persisted date string.
///
/// Accepts `YYYY-MM-DD` and the legacy `DD/MM/YYYY` form so rows written by
/// either convention compare on the same calendar type.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, LEGACY_DATE_FORMAT))
        .map_err(|_| ValidationError::InvalidInput(format!("Unrecognized date '{}'", value)).into())
}

/// Formats a date in the canonical persisted form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// First and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    let last = next_month.and_then(|d| d.pred_opt()).unwrap_or(date);
    (first, last)
}

pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            break;
        }
    }
    days
}
