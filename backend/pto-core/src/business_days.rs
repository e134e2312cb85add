// src/business_days.rs
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::models::HOURS_PER_DAY;

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts Monday–Friday dates in `[start, end]` inclusive. An inverted range counts zero.
///
/// Dates are calendar dates as the user entered them (local time); no
/// timezone conversion happens here.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_business_day(*day))
        .count() as u32
}

/// Hours a request over `[start, end]` is worth. A same-day request is always one full day.
pub fn business_days_hours(start: NaiveDate, end: NaiveDate) -> Decimal {
    if start == end {
        return HOURS_PER_DAY;
    }
    Decimal::from(business_days(start, end)) * HOURS_PER_DAY
}
