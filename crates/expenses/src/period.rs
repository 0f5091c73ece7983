//! Calendar windows for summary views.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use splitledger_core::{DomainError, DomainResult};

/// Half-open UTC window covering one calendar month: `[first of month,
/// first of next month)`. `month` is 1-based.
pub fn month_window(year: i32, month: u32) -> DomainResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::validation(format!("invalid month: {year}-{month}")))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| DomainError::validation(format!("invalid month: {year}-{month}")))?;

    Ok((
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    ))
}
