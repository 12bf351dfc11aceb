//! UTC calendar boundary helpers for date-scoped queries.
//!
//! Date filters arrive as calendar dates while the store compares
//! instants. These helpers pin the boundary instants down in one place so
//! both repository backends agree on them.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

/// First instant (00:00:00 UTC) of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Last counted instant (23:59:59 UTC) of `date`.
///
/// An inclusive upper bound built from this value covers the whole named
/// day.
#[must_use]
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time");
    Utc.from_utc_datetime(&date.and_time(last_second))
}

/// First instant of the calendar month containing `at`.
#[must_use]
pub fn start_of_month(at: DateTime<Utc>) -> DateTime<Utc> {
    let date = at.date_naive();
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("day 1 exists in every month");
    Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN))
}
