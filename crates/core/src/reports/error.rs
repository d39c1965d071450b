//! Report errors.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while building reports.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The requested year/month does not form a valid calendar period.
    #[error("invalid report period: year {year}, month {month:?}")]
    InvalidPeriod {
        /// Requested year.
        year: i32,
        /// Requested 1-indexed month, if any.
        month: Option<u32>,
    },

    /// An explicit date range runs backwards.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },
}
