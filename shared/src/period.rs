//! Calendar buckets for the dashboard income series
//!
//! A series is either one bucket per day of a selected month, or one bucket
//! per month of a selected year. Buckets are half-open UTC intervals
//! `[start, end)` so adjacent buckets never double count a transaction.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Thai month abbreviations used as chart labels for the yearly view
pub const THAI_MONTH_ABBREVIATIONS: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.",
    "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("date out of range: {year}-{month:02}")]
    OutOfRange { year: i32, month: u32 },

    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// The granularity of the income series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesPeriod {
    /// One bucket per calendar day of `month` in `year`
    Daily { year: i32, month: u32 },
    /// One bucket per calendar month of `year`
    Monthly { year: i32 },
}

/// One time unit of the income series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesBucket {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SeriesPeriod {
    pub fn new(year: i32, month: Option<u32>) -> Self {
        match month {
            Some(month) => SeriesPeriod::Daily { year, month },
            None => SeriesPeriod::Monthly { year },
        }
    }

    pub fn year(&self) -> i32 {
        match *self {
            SeriesPeriod::Daily { year, .. } | SeriesPeriod::Monthly { year } => year,
        }
    }

    /// Expand the period into its buckets, in calendar order
    pub fn buckets(&self) -> Result<Vec<SeriesBucket>, PeriodError> {
        match *self {
            SeriesPeriod::Daily { year, month } => {
                let first = month_start(year, month)?;
                let days = days_in_month(year, month)?;
                (0..days)
                    .map(|offset| -> Result<SeriesBucket, PeriodError> {
                        let day = first + chrono::Duration::days(i64::from(offset));
                        let next = day + chrono::Duration::days(1);
                        Ok(SeriesBucket {
                            label: (offset + 1).to_string(),
                            start: utc_midnight(day)?,
                            end: utc_midnight(next)?,
                        })
                    })
                    .collect()
            }
            SeriesPeriod::Monthly { year } => (1..=12u32)
                .map(|month| -> Result<SeriesBucket, PeriodError> {
                    let (next_year, next_month) = next_month(year, month);
                    Ok(SeriesBucket {
                        label: THAI_MONTH_ABBREVIATIONS[(month - 1) as usize].to_string(),
                        start: utc_midnight(month_start(year, month)?)?,
                        end: utc_midnight(month_start(next_year, next_month)?)?,
                    })
                })
                .collect(),
        }
    }
}

/// The current year on the UTC calendar the buckets are cut from
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Number of days in the given month, leap years included
pub fn days_in_month(year: i32, month: u32) -> Result<u32, PeriodError> {
    let (next_year, next_month) = next_month(year, month);
    let days = month_start(next_year, next_month)?
        .signed_duration_since(month_start(year, month)?)
        .num_days();
    Ok(days as u32)
}

/// Parse the inclusive bounds of an income date range.
///
/// Plain `YYYY-MM-DD` dates resolve to midnight UTC; RFC 3339 timestamps are
/// used as given. An inverted range is not an error, it simply matches
/// nothing.
pub fn parse_range_bounds(
    start: &str,
    end: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>), PeriodError> {
    Ok((parse_bound(start)?, parse_bound(end)?))
}

fn parse_bound(raw: &str) -> Result<DateTime<Utc>, PeriodError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return utc_midnight(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PeriodError::InvalidDate(raw.to_string()))
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn month_start(year: i32, month: u32) -> Result<NaiveDate, PeriodError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(PeriodError::OutOfRange { year, month })
}

fn utc_midnight(date: NaiveDate) -> Result<DateTime<Utc>, PeriodError> {
    let naive: NaiveDateTime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| PeriodError::InvalidDate(date.to_string()))?;
    Ok(Utc.from_utc_datetime(&naive))
}
