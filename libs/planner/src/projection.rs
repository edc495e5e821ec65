//! Projection of a program onto calendar dates
//!
//! Given an assignment window and a program, every date maps to at most one
//! day slot: `d = date - start`, week `d / 7`, day `d % 7`. Dates outside the
//! window, or past the last program week, are rest days.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use thiserror::Error;

use crate::program::{DAYS_PER_WEEK, ProgramData, ProgramWorkout};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("program end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

/// Dates an athlete follows an assigned program. `end` is inclusive; `None`
/// leaves the window open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramWindow {
    start: NaiveDate,
    end: Option<NaiveDate>,
}

/// Position of a date inside a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlot {
    pub week: usize,
    pub day: usize,
}

impl ProgramWindow {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, WindowError> {
        match end {
            Some(end) if end < start => Err(WindowError::EndBeforeStart { start, end }),
            _ => Ok(Self { start, end }),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.is_none_or(|end| date <= end)
    }

    /// Week/day slot for a date inside the window
    pub fn slot(&self, date: NaiveDate) -> Option<DaySlot> {
        if !self.contains(date) {
            return None;
        }
        let elapsed = (date - self.start).num_days() as usize;
        Some(DaySlot {
            week: elapsed / DAYS_PER_WEEK,
            day: elapsed % DAYS_PER_WEEK,
        })
    }

    /// Calendar weekday a program day slot falls on for this window
    pub fn weekday_of_slot(&self, day: usize) -> Weekday {
        (0..day % DAYS_PER_WEEK).fold(self.start.weekday(), |weekday, _| weekday.succ())
    }
}

/// Workouts scheduled on `date`; empty means a rest day
pub fn workouts_on<'a>(
    program: &'a ProgramData,
    window: &ProgramWindow,
    date: NaiveDate,
) -> &'a [ProgramWorkout] {
    match window.slot(date) {
        Some(slot) => program.day(slot.week, slot.day),
        None => &[],
    }
}

/// First date on which the program has nothing left to schedule; `None` when
/// that date is past the end of the calendar
pub fn exhausted_on(program: &ProgramData, window: &ProgramWindow) -> Option<NaiveDate> {
    window
        .start
        .checked_add_days(Days::new(program.total_days() as u64))
}

/// An athlete's current program assignment, when complete
#[derive(Debug, Clone, Copy)]
pub struct Assignment<'a> {
    pub window: ProgramWindow,
    pub program: &'a ProgramData,
}

impl<'a> Assignment<'a> {
    /// Build an assignment from the stored columns. Missing start date or
    /// snapshot means nothing is assigned; an inverted window is treated the
    /// same way since it can never schedule anything.
    pub fn from_parts(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        program: Option<&'a ProgramData>,
    ) -> Option<Self> {
        let window = ProgramWindow::new(start?, end).ok()?;
        Some(Self {
            window,
            program: program?,
        })
    }

    pub fn workouts_on(&self, date: NaiveDate) -> &'a [ProgramWorkout] {
        workouts_on(self.program, &self.window, date)
    }

    pub fn is_training_day(&self, date: NaiveDate) -> bool {
        !self.workouts_on(date).is_empty()
    }

    /// Weekday each of the seven program day slots lands on
    pub fn slot_weekdays(&self) -> [Weekday; DAYS_PER_WEEK] {
        std::array::from_fn(|day| self.window.weekday_of_slot(day))
    }

    pub fn exhausted_on(&self) -> Option<NaiveDate> {
        exhausted_on(self.program, &self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Week;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn labelled_program(weeks: usize) -> ProgramData {
        let mut program = ProgramData::default();
        for w in 0..weeks {
            let mut week = Week::empty(w as u32);
            for (d, slot) in week.days.iter_mut().enumerate() {
                slot.push(ProgramWorkout {
                    id: format!("w{}d{}", w, d),
                    exercise: format!("Week {} Day {}", w, d),
                    ..Default::default()
                });
            }
            program.weeks.push(week);
        }
        program
    }

    #[test]
    fn test_start_date_is_slot_zero() {
        let program = labelled_program(1);
        let window = ProgramWindow::new(date(2024, 1, 3), None).unwrap();
        assert_eq!(workouts_on(&program, &window, date(2024, 1, 3))[0].id, "w0d0");
    }

    #[test]
    fn test_end_date_is_inclusive_and_day_after_is_empty() {
        let program = labelled_program(4);
        let window = ProgramWindow::new(date(2024, 1, 1), Some(date(2024, 1, 10))).unwrap();
        assert_eq!(workouts_on(&program, &window, date(2024, 1, 10))[0].id, "w1d2");
        assert!(workouts_on(&program, &window, date(2024, 1, 11)).is_empty());
    }

    #[test]
    fn test_before_start_is_empty() {
        let program = labelled_program(2);
        let window = ProgramWindow::new(date(2024, 1, 1), None).unwrap();
        assert!(workouts_on(&program, &window, date(2023, 12, 31)).is_empty());
    }

    #[test]
    fn test_shorter_program_than_elapsed_time_is_empty() {
        let program = labelled_program(2);
        let window = ProgramWindow::new(date(2024, 1, 1), None).unwrap();
        assert_eq!(exhausted_on(&program, &window), Some(date(2024, 1, 15)));
        assert!(workouts_on(&program, &window, date(2024, 1, 15)).is_empty());
        assert!(workouts_on(&program, &window, date(2024, 6, 1)).is_empty());
    }

    #[test]
    fn test_worked_example_from_monday_start() {
        let program = labelled_program(2);
        let window = ProgramWindow::new(date(2024, 1, 1), None).unwrap();
        assert_eq!(window.start().weekday(), Weekday::Mon);
        assert_eq!(
            window.slot(date(2024, 1, 8)),
            Some(DaySlot { week: 1, day: 0 })
        );
        assert_eq!(workouts_on(&program, &window, date(2024, 1, 8))[0].id, "w1d0");
    }

    #[test]
    fn test_slots_follow_start_weekday_not_calendar_weekday() {
        // A Wednesday start puts slot 0 on Wednesday; the Monday-first grid
        // only aligns with slot labels when programs start on Monday.
        let window = ProgramWindow::new(date(2024, 1, 3), None).unwrap();
        assert_eq!(window.weekday_of_slot(0), Weekday::Wed);
        assert_eq!(window.weekday_of_slot(5), Weekday::Mon);
        assert_eq!(window.weekday_of_slot(7), Weekday::Wed);
        assert_eq!(
            window.slot(date(2024, 1, 8)),
            Some(DaySlot { week: 0, day: 5 })
        );
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        assert_eq!(
            ProgramWindow::new(date(2024, 2, 1), Some(date(2024, 1, 1))),
            Err(WindowError::EndBeforeStart {
                start: date(2024, 2, 1),
                end: date(2024, 1, 1),
            })
        );
    }

    #[test]
    fn test_incomplete_assignment_is_none() {
        let program = labelled_program(1);
        assert!(Assignment::from_parts(None, None, Some(&program)).is_none());
        assert!(Assignment::from_parts(Some(date(2024, 1, 1)), None, None).is_none());
        let assignment = Assignment::from_parts(Some(date(2024, 1, 1)), None, Some(&program)).unwrap();
        assert!(assignment.is_training_day(date(2024, 1, 7)));
        assert!(!assignment.is_training_day(date(2024, 1, 8)));
    }
}
