// src/tenure.rs
use chrono::{Datelike, NaiveDate};

/// Whole months of service between `start` and `today`.
///
/// A month only counts once the day-of-month of `start` has been reached, so
/// 2024-01-31 → 2024-02-29 is still zero months. A start date after `today`
/// yields zero.
pub fn tenure_months(start: NaiveDate, today: NaiveDate) -> u32 {
    if start > today {
        return 0;
    }
    let mut months = (today.year() - start.year()) * 12 + today.month() as i32
        - start.month() as i32;
    if today.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Whole years of service; a future start date yields zero.
pub fn tenure_years(start: NaiveDate, today: NaiveDate) -> u32 {
    tenure_months(start, today) / 12
}
