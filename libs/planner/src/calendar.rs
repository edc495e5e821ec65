//! Monday-first calendar layouts

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// Cells in a month grid: six rows of seven days
pub const MONTH_GRID_CELLS: usize = 42;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month {0:?}, expected YYYY-MM")]
    InvalidMonth(String),
    #[error("the week of {0} falls outside the supported calendar")]
    OutOfRange(NaiveDate),
}

/// One cell of a month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCell {
    pub date: NaiveDate,
    pub in_month: bool,
}

/// The Monday on or before `date`
pub fn start_of_week(date: NaiveDate) -> Result<NaiveDate, CalendarError> {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset))
        .ok_or(CalendarError::OutOfRange(date))
}

/// Monday..Sunday of the week containing `date`
pub fn week_of(date: NaiveDate) -> Result<[NaiveDate; 7], CalendarError> {
    let monday = start_of_week(date)?;
    monday
        .checked_add_days(Days::new(6))
        .ok_or(CalendarError::OutOfRange(date))?;
    Ok(std::array::from_fn(|i| monday + Days::new(i as u64)))
}

/// `days` consecutive dates starting at `from`
pub fn date_range(from: NaiveDate, days: usize) -> Vec<NaiveDate> {
    from.iter_days().take(days).collect()
}

/// Parse `YYYY-MM`
pub fn parse_month(raw: &str) -> Result<NaiveDate, CalendarError> {
    let invalid = || CalendarError::InvalidMonth(raw.to_string());
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// 42-cell grid for the month containing `month`, padded with the tail of the
/// previous month and the head of the next
pub fn month_grid(month: NaiveDate) -> Result<Vec<MonthCell>, CalendarError> {
    let first = month.with_day(1).unwrap_or(month);
    let grid_start = start_of_week(first)?;

    let grid: Vec<MonthCell> = grid_start
        .iter_days()
        .take(MONTH_GRID_CELLS)
        .map(|date| MonthCell {
            date,
            in_month: date.year() == first.year() && date.month() == first.month(),
        })
        .collect();
    if grid.len() < MONTH_GRID_CELLS {
        return Err(CalendarError::OutOfRange(month));
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_of_week_is_monday() {
        assert_eq!(start_of_week(date(2024, 1, 7)).unwrap(), date(2024, 1, 1));
        assert_eq!(start_of_week(date(2024, 1, 1)).unwrap(), date(2024, 1, 1));
        assert_eq!(start_of_week(date(2024, 3, 1)).unwrap(), date(2024, 2, 26));
    }

    #[test]
    fn test_week_of_spans_monday_to_sunday() {
        let week = week_of(date(2024, 1, 3)).unwrap();
        assert_eq!(week[0], date(2024, 1, 1));
        assert_eq!(week[6], date(2024, 1, 7));
        assert_eq!(week[6].weekday(), Weekday::Sun);
    }

    #[test]
    fn test_month_grid_shape() {
        // February 2024 starts on a Thursday
        let grid = month_grid(date(2024, 2, 15)).unwrap();
        assert_eq!(grid.len(), MONTH_GRID_CELLS);
        assert_eq!(grid[0].date, date(2024, 1, 29));
        assert!(!grid[0].in_month);
        assert_eq!(grid[3].date, date(2024, 2, 1));
        assert!(grid[3].in_month);
        assert_eq!(grid.iter().filter(|c| c.in_month).count(), 29);
        assert_eq!(grid[41].date, date(2024, 3, 10));
    }

    #[test]
    fn test_month_starting_monday_has_no_leading_padding() {
        let grid = month_grid(date(2024, 1, 1)).unwrap();
        assert_eq!(grid[0].date, date(2024, 1, 1));
        assert!(grid[0].in_month);
    }

    #[test]
    fn test_parse_month_accepts_and_rejects() {
        assert_eq!(parse_month("2024-02"), Ok(date(2024, 2, 1)));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("February").is_err());
    }

    #[test]
    fn test_date_range_is_consecutive() {
        let range = date_range(date(2024, 1, 29), 35);
        assert_eq!(range.len(), 35);
        assert_eq!(range[34], date(2024, 3, 3));
    }

    #[test]
    fn test_weeks_at_the_calendar_bounds_are_errors() {
        // NaiveDate::MIN is a Thursday, so its Monday does not exist
        assert_eq!(
            start_of_week(NaiveDate::MIN),
            Err(CalendarError::OutOfRange(NaiveDate::MIN))
        );
        assert!(week_of(NaiveDate::MIN).is_err());

        // The Sunday after the last representable Monday does not exist
        assert!(start_of_week(NaiveDate::MAX).is_ok());
        assert_eq!(
            week_of(NaiveDate::MAX),
            Err(CalendarError::OutOfRange(NaiveDate::MAX))
        );

        let last_monday = start_of_week(NaiveDate::MAX).unwrap();
        assert!(week_of(last_monday).is_err());
        assert!(month_grid(NaiveDate::MAX).is_err());
        assert!(month_grid(NaiveDate::MIN).is_err());
    }
}
