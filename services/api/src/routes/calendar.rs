//! Athlete month calendar and the coach's multi-athlete calendar

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc, Weekday};
use planner::{
    Assignment, DAYS_PER_WEEK, ProgramWorkout,
    calendar::{date_range, month_grid, parse_month, start_of_week},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::CoachSession,
    models::{athlete::Athlete, workout::AthleteWorkout},
    routes::athletes::load_athlete,
    state::AppState,
};

/// Days shown by the coach calendar when not specified
pub const DEFAULT_RANGE_DAYS: usize = 35;
const MAX_RANGE_DAYS: usize = 366;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    #[serde(default)]
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_month: bool,
    /// Workouts the assigned program schedules on this date
    pub program: Vec<ProgramWorkout>,
    /// Workouts scheduled directly on the athlete
    pub workouts: Vec<AthleteWorkout>,
}

/// How the assigned program lines up with the calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentOutline {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Weekday of each program day slot, for labelling the builder columns
    pub slot_weekdays: [Weekday; DAYS_PER_WEEK],
    /// First date with nothing left to schedule
    pub exhausted_on: Option<NaiveDate>,
}

impl From<&Assignment<'_>> for AssignmentOutline {
    fn from(assignment: &Assignment<'_>) -> Self {
        Self {
            start_date: assignment.window.start(),
            end_date: assignment.window.end(),
            slot_weekdays: assignment.slot_weekdays(),
            exhausted_on: assignment.exhausted_on(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AthleteCalendar {
    pub month: String,
    pub assignment: Option<AssignmentOutline>,
    pub days: Vec<CalendarCell>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub days: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledAthlete {
    pub athlete_id: Uuid,
    pub name: String,
    pub exercises: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CoachCalendarDay {
    pub date: NaiveDate,
    pub athletes: Vec<ScheduledAthlete>,
}

#[derive(Debug, Serialize)]
pub struct CoachCalendar {
    pub from: NaiveDate,
    pub days: Vec<CoachCalendarDay>,
}

/// Athletes with a non-empty projected program day on each date
pub fn coach_schedule(athletes: &[Athlete], dates: &[NaiveDate]) -> Vec<CoachCalendarDay> {
    dates
        .iter()
        .map(|&date| CoachCalendarDay {
            date,
            athletes: athletes
                .iter()
                .filter_map(|athlete| {
                    let scheduled = athlete.assignment()?.workouts_on(date);
                    if scheduled.is_empty() {
                        return None;
                    }
                    Some(ScheduledAthlete {
                        athlete_id: athlete.id,
                        name: athlete.full_name(),
                        exercises: scheduled.iter().map(|w| w.exercise.clone()).collect(),
                    })
                })
                .collect(),
        })
        .collect()
}

pub async fn athlete_calendar(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<AthleteCalendar>> {
    let month = match query.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => Utc::now().date_naive(),
    };
    let athlete = load_athlete(&state, session.coach.id, id).await?;

    let grid = month_grid(month)?;
    let (first, last) = match (grid.first(), grid.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Err(ApiError::Internal),
    };

    let mut by_date: BTreeMap<NaiveDate, Vec<AthleteWorkout>> = BTreeMap::new();
    for row in state
        .workouts
        .list_for_athlete(athlete.id, Some(first), Some(last))
        .await?
    {
        by_date.entry(row.date).or_default().push(AthleteWorkout::from(row));
    }

    let assignment = athlete.assignment();
    let days = grid
        .into_iter()
        .map(|cell| CalendarCell {
            date: cell.date,
            in_month: cell.in_month,
            program: assignment
                .map(|a| a.workouts_on(cell.date).to_vec())
                .unwrap_or_default(),
            workouts: by_date.remove(&cell.date).unwrap_or_default(),
        })
        .collect();

    Ok(Json(AthleteCalendar {
        month: month.format("%Y-%m").to_string(),
        assignment: assignment.as_ref().map(AssignmentOutline::from),
        days,
    }))
}

pub async fn coach_calendar(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<CoachCalendar>> {
    let days = query.days.unwrap_or(DEFAULT_RANGE_DAYS);
    if days == 0 || days > MAX_RANGE_DAYS {
        return Err(ApiError::Validation(format!(
            "days must be between 1 and {}",
            MAX_RANGE_DAYS
        )));
    }
    let from = start_of_week(query.from.unwrap_or_else(|| Utc::now().date_naive()))?;

    let athletes = state.athletes.list_for_coach(session.coach.id).await?;
    let dates = date_range(from, days);

    Ok(Json(CoachCalendar {
        from,
        days: coach_schedule(&athletes, &dates),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::athlete::fixtures::athlete;
    use planner::{ProgramData, Week};
    use sqlx::types::Json as SqlJson;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_coach_schedule_lists_only_training_athletes() {
        let mut week = Week::empty(0);
        if let Some(slot) = week.days.get_mut(0) {
            slot.push(ProgramWorkout {
                exercise: "Back Squat".to_string(),
                ..Default::default()
            });
        }
        let program = ProgramData { weeks: vec![week] };

        let mut training = athlete("Jane", "Doe");
        training.program_id = Some(Uuid::new_v4());
        training.program_start_date = Some(date(2024, 1, 1));
        training.program_data = Some(SqlJson(program));
        let idle = athlete("John", "Smith");

        let dates = date_range(date(2024, 1, 1), 8);
        let schedule = coach_schedule(&[training.clone(), idle], &dates);

        assert_eq!(schedule.len(), 8);
        assert_eq!(schedule[0].athletes.len(), 1);
        assert_eq!(schedule[0].athletes[0].name, "Jane Doe");
        assert_eq!(schedule[0].athletes[0].exercises, vec!["Back Squat"]);
        assert!(schedule[1..].iter().all(|day| day.athletes.is_empty()));
    }

    #[test]
    fn test_outline_labels_slots_from_the_start_weekday() {
        let mut week = Week::empty(0);
        if let Some(slot) = week.days.get_mut(2) {
            slot.push(ProgramWorkout::default());
        }
        let program = ProgramData {
            weeks: vec![week.clone(), week],
        };
        // 2024-01-03 is a Wednesday
        let assignment = Assignment::from_parts(Some(date(2024, 1, 3)), None, Some(&program)).unwrap();
        let outline = AssignmentOutline::from(&assignment);

        assert_eq!(outline.slot_weekdays[0], Weekday::Wed);
        assert_eq!(outline.slot_weekdays[5], Weekday::Mon);
        assert_eq!(outline.exhausted_on, Some(date(2024, 1, 17)));
        assert_eq!(outline.end_date, None);
    }
}
