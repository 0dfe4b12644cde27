//! Calendar-month window helpers.
//!
//! The aggregators all reason in whole calendar months: the committee report
//! over a trailing 12-month window, the commodity trend over a trailing
//! 6-month window. These helpers produce the (year, month) sequences and
//! boundary dates for those windows.

use chrono::{Datelike, NaiveDate};

/// Returns the trailing `n` calendar months ending at `as_of`'s month,
/// oldest first, as (year, month) pairs.
#[must_use]
pub fn trailing_months(as_of: NaiveDate, n: usize) -> Vec<(i32, u32)> {
    let mut year = as_of.year();
    let mut month = as_of.month();
    let mut months = Vec::with_capacity(n);

    for _ in 0..n {
        months.push((year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    months.reverse();
    months
}

/// First day of the oldest month in a trailing `n`-month window ending at `as_of`.
#[must_use]
pub fn window_start(as_of: NaiveDate, n: usize) -> NaiveDate {
    let (year, month) = trailing_months(as_of, n)[0];
    // Day 1 of a valid (year, month) always exists
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(as_of)
}

/// First day of the month after `as_of`'s month (exclusive window end).
#[must_use]
pub fn next_month_start(as_of: NaiveDate) -> NaiveDate {
    let (year, month) = if as_of.month() == 12 {
        (as_of.year() + 1, 1)
    } else {
        (as_of.year(), as_of.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(as_of)
}

/// Formats a (year, month) pair as the wire key, e.g. `"2025-03"`.
#[must_use]
pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// English month name for a 1-based month number; empty for out-of-range input.
#[must_use]
pub const fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

/// Rounds to two decimal places, the precision used for monetary values and
/// percentages on the wire.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
