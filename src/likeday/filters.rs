//! Historical pool filters
//!
//! Each filter is a pure function over a pool of daily profiles: it returns a
//! new pool and is skipped entirely when its argument is `None`. The target
//! day never passes through these; only the historical pool is narrowed.

use chrono::{Datelike, NaiveDate};

use crate::domain::DailyProfile;

/// Keep days inside the inclusive `[start, end]` window. An absent bound is
/// open on that side.
pub fn filter_date_range(
    pool: Vec<DailyProfile>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<DailyProfile> {
    if start.is_none() && end.is_none() {
        return pool;
    }
    pool.into_iter()
        .filter(|p| start.map_or(true, |s| p.date >= s))
        .filter(|p| end.map_or(true, |e| p.date <= e))
        .collect()
}

/// Keep days whose weekday is in `days`, numbered 0 = Sunday .. 6 = Saturday.
pub fn filter_days_of_week(pool: Vec<DailyProfile>, days: Option<&[u32]>) -> Vec<DailyProfile> {
    match days {
        None => pool,
        Some(days) => pool
            .into_iter()
            .filter(|p| days.contains(&p.date.weekday().num_days_from_sunday()))
            .collect(),
    }
}

/// Keep days whose calendar month (1-12) is in `months`.
pub fn filter_months(pool: Vec<DailyProfile>, months: Option<&[u32]>) -> Vec<DailyProfile> {
    match months {
        None => pool,
        Some(months) => pool
            .into_iter()
            .filter(|p| months.contains(&p.date.month()))
            .collect(),
    }
}
