//! Edits applied to a program while it is being built

use thiserror::Error;
use uuid::Uuid;

use crate::program::{DAYS_PER_WEEK, ProgramData, ProgramWorkout, Week};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("week {0} does not exist")]
    UnknownWeek(usize),
    #[error("day {0} is out of range (0-6)")]
    UnknownDay(usize),
    #[error("workout {0} not found")]
    UnknownWorkout(String),
}

pub type BuilderResult<T> = Result<T, BuilderError>;

fn fresh_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn slot_mut(
    program: &mut ProgramData,
    week: usize,
    day: usize,
) -> BuilderResult<&mut Vec<ProgramWorkout>> {
    if day >= DAYS_PER_WEEK {
        return Err(BuilderError::UnknownDay(day));
    }
    let week_plan = program
        .weeks
        .get_mut(week)
        .ok_or(BuilderError::UnknownWeek(week))?;
    week_plan.days.get_mut(day).ok_or(BuilderError::UnknownDay(day))
}

/// Append an empty week and return its index
pub fn add_week(program: &mut ProgramData) -> usize {
    let index = program.weeks.len();
    program.weeks.push(Week::empty(index as u32));
    index
}

/// Append a copy of `week` with new ids for every workout and set
pub fn duplicate_week(program: &mut ProgramData, week: usize) -> BuilderResult<usize> {
    let mut copy = program
        .weeks
        .get(week)
        .cloned()
        .ok_or(BuilderError::UnknownWeek(week))?;

    for slot in copy.days.iter_mut() {
        for workout in slot.iter_mut() {
            workout.id = fresh_id();
            for set in workout.sets.iter_mut() {
                set.id = fresh_id();
            }
        }
    }

    let index = program.weeks.len();
    copy.id = index as u32;
    program.weeks.push(copy);
    Ok(index)
}

/// Remove every workout from one day slot
pub fn clear_day(program: &mut ProgramData, week: usize, day: usize) -> BuilderResult<()> {
    slot_mut(program, week, day)?.clear();
    Ok(())
}

/// Append a workout to a day slot, assigning ids where missing
pub fn add_workout(
    program: &mut ProgramData,
    week: usize,
    day: usize,
    mut workout: ProgramWorkout,
) -> BuilderResult<String> {
    if workout.id.is_empty() {
        workout.id = fresh_id();
    }
    for set in workout.sets.iter_mut().filter(|s| s.id.is_empty()) {
        set.id = fresh_id();
    }
    let id = workout.id.clone();
    slot_mut(program, week, day)?.push(workout);
    Ok(id)
}

/// Remove one workout from a day slot by id
pub fn remove_workout(
    program: &mut ProgramData,
    week: usize,
    day: usize,
    workout_id: &str,
) -> BuilderResult<ProgramWorkout> {
    let slot = slot_mut(program, week, day)?;
    let position = slot
        .iter()
        .position(|w| w.id == workout_id)
        .ok_or_else(|| BuilderError::UnknownWorkout(workout_id.to_string()))?;
    Ok(slot.remove(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramSet;

    fn squat() -> ProgramWorkout {
        ProgramWorkout {
            exercise: "Back Squat".to_string(),
            sets: vec![
                ProgramSet {
                    reps: 5,
                    ..Default::default()
                },
                ProgramSet {
                    reps: 5,
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_add_week_appends_empty_week() {
        let mut program = ProgramData::default();
        assert_eq!(add_week(&mut program), 0);
        assert_eq!(add_week(&mut program), 1);
        assert_eq!(program.weeks[1].id, 1);
        assert!(!program.has_any_workouts());
    }

    #[test]
    fn test_duplicate_week_copies_with_fresh_ids() {
        let mut program = ProgramData::default();
        add_week(&mut program);
        let original_id = add_workout(&mut program, 0, 2, squat()).unwrap();

        let copy = duplicate_week(&mut program, 0).unwrap();
        assert_eq!(copy, 1);

        let original = &program.day(0, 2)[0];
        let cloned = &program.day(1, 2)[0];
        assert_eq!(cloned.exercise, "Back Squat");
        assert_eq!(original.id, original_id);
        assert_ne!(cloned.id, original.id);
        assert_ne!(cloned.sets[0].id, original.sets[0].id);
        assert_eq!(cloned.sets.len(), 2);
    }

    #[test]
    fn test_duplicate_missing_week_fails() {
        let mut program = ProgramData::default();
        assert_eq!(duplicate_week(&mut program, 3), Err(BuilderError::UnknownWeek(3)));
    }

    #[test]
    fn test_clear_day_only_touches_one_slot() {
        let mut program = ProgramData::default();
        add_week(&mut program);
        add_workout(&mut program, 0, 0, squat()).unwrap();
        add_workout(&mut program, 0, 1, squat()).unwrap();

        clear_day(&mut program, 0, 0).unwrap();
        assert!(program.day(0, 0).is_empty());
        assert_eq!(program.day(0, 1).len(), 1);
        assert_eq!(clear_day(&mut program, 0, 7), Err(BuilderError::UnknownDay(7)));
    }

    #[test]
    fn test_remove_workout_by_id() {
        let mut program = ProgramData::default();
        add_week(&mut program);
        let id = add_workout(&mut program, 0, 4, squat()).unwrap();

        assert!(remove_workout(&mut program, 0, 4, "nope").is_err());
        let removed = remove_workout(&mut program, 0, 4, &id).unwrap();
        assert_eq!(removed.exercise, "Back Squat");
        assert!(program.day(0, 4).is_empty());
    }
}
