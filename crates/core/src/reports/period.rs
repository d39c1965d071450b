//! Calendar windows for report queries.

use chrono::NaiveDate;

use super::error::ReportError;

/// An inclusive `[start, end]` date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Window covering a full calendar year.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidPeriod` for years outside the calendar.
    pub fn year(year: i32) -> Result<Self, ReportError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = NaiveDate::from_ymd_opt(year, 12, 31);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(ReportError::InvalidPeriod { year, month: None }),
        }
    }

    /// Window covering one calendar month. `month` is 1-indexed.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidPeriod` when the month is out of range.
    pub fn month(year: i32, month: u32) -> Result<Self, ReportError> {
        let invalid = || ReportError::InvalidPeriod {
            year,
            month: Some(month),
        };

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        // Last day = first day of the following month, minus one.
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let end = next_month.pred_opt().ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    /// Resolves the conventional report arguments: a year, optionally
    /// narrowed to one 1-indexed month.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidPeriod` when the inputs do not form a
    /// calendar period.
    pub fn resolve(year: i32, month: Option<u32>) -> Result<Self, ReportError> {
        match month {
            Some(m) => Self::month(year, m),
            None => Self::year(year),
        }
    }

    /// Builds a window from explicit bounds, validating their order.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` when `start > end`.
    pub fn from_bounds(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_year_window() {
        let window = ReportWindow::year(2026).unwrap();
        assert_eq!(window.start, date(2026, 1, 1));
        assert_eq!(window.end, date(2026, 12, 31));
    }

    #[test]
    fn test_month_window_thirty_days() {
        let window = ReportWindow::month(2026, 4).unwrap();
        assert_eq!(window.start, date(2026, 4, 1));
        assert_eq!(window.end, date(2026, 4, 30));
    }

    #[test]
    fn test_month_window_december_wraps_year() {
        let window = ReportWindow::month(2026, 12).unwrap();
        assert_eq!(window.end, date(2026, 12, 31));
    }

    #[test]
    fn test_february_leap_year() {
        let window = ReportWindow::month(2024, 2).unwrap();
        assert_eq!(window.end, date(2024, 2, 29));

        let window = ReportWindow::month(2026, 2).unwrap();
        assert_eq!(window.end, date(2026, 2, 28));
    }

    #[test]
    fn test_month_out_of_range() {
        assert!(matches!(
            ReportWindow::month(2026, 13),
            Err(ReportError::InvalidPeriod { .. })
        ));
        assert!(matches!(
            ReportWindow::month(2026, 0),
            Err(ReportError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_resolve_prefers_month() {
        assert_eq!(
            ReportWindow::resolve(2026, Some(7)).unwrap(),
            ReportWindow::month(2026, 7).unwrap()
        );
        assert_eq!(
            ReportWindow::resolve(2026, None).unwrap(),
            ReportWindow::year(2026).unwrap()
        );
    }

    #[test]
    fn test_from_bounds_rejects_backwards_range() {
        let start = date(2026, 5, 1);
        let end = date(2026, 4, 1);
        assert_eq!(
            ReportWindow::from_bounds(start, end),
            Err(ReportError::InvalidDateRange { start, end })
        );
    }
}
