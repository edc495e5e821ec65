//! Scheduled athlete workout models

use chrono::{DateTime, NaiveDate, Utc};
use planner::{SetEntry, report::ReportEntry, workout::{SetField, parse_sets}};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Row as stored; `sets` may hold legacy shapes
#[derive(Debug, Clone, FromRow)]
pub struct AthleteWorkoutRow {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub date: NaiveDate,
    pub position: i32,
    pub exercise_id: Option<Uuid>,
    pub name: String,
    pub muscle_group: Option<String>,
    pub sets: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AthleteWorkout {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub date: NaiveDate,
    pub position: i32,
    pub exercise_id: Option<Uuid>,
    pub name: String,
    pub muscle_group: Option<String>,
    pub sets: Vec<SetEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AthleteWorkoutRow> for AthleteWorkout {
    fn from(row: AthleteWorkoutRow) -> Self {
        Self {
            sets: parse_sets(&row.sets),
            id: row.id,
            athlete_id: row.athlete_id,
            date: row.date,
            position: row.position,
            exercise_id: row.exercise_id,
            name: row.name,
            muscle_group: row.muscle_group,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl AthleteWorkout {
    pub fn report_entry(&self) -> ReportEntry {
        ReportEntry {
            name: self.name.clone(),
            sets: self.sets.clone(),
        }
    }

    /// Set one field of set `index`, adding empty sets up to it
    pub fn edit_set(&mut self, index: usize, field: SetField, value: String) {
        if self.sets.len() <= index {
            self.sets.resize_with(index + 1, SetEntry::default);
        }
        self.sets[index].set(field, value);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutRangeQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub date: NaiveDate,
    pub exercise_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSetRequest {
    pub field: SetField,
    #[serde(default)]
    pub value: Value,
}

impl UpdateSetRequest {
    /// Cell text for the value; numbers are kept as typed, null clears
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Order of a day's workouts after moving the one at `index` up. The first
/// workout wraps to the bottom.
pub fn move_up_order(ids: &[Uuid], index: usize) -> Vec<Uuid> {
    let mut order = ids.to_vec();
    if index >= order.len() {
        return order;
    }
    if index == 0 {
        order.rotate_left(1);
    } else {
        order.swap(index - 1, index);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(sets: Value) -> AthleteWorkoutRow {
        AthleteWorkoutRow {
            id: Uuid::new_v4(),
            athlete_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            position: 0,
            exercise_id: None,
            name: "Bench Press".into(),
            muscle_group: Some("Chest".into()),
            sets,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_legacy_string_sets_are_read() {
        let workout = AthleteWorkout::from(row(json!("[{\"reps\":\"5\",\"weight\":\"100\"}]")));
        assert_eq!(workout.sets.len(), 1);
        assert_eq!(workout.sets[0].reps, "5");
    }

    #[test]
    fn test_edit_set_initialises_missing_sets() {
        let mut workout = AthleteWorkout::from(row(json!([])));
        workout.edit_set(2, SetField::Reps, "8".into());
        assert_eq!(workout.sets.len(), 3);
        assert!(workout.sets[0].is_blank());
        assert_eq!(workout.sets[2].reps, "8");
    }

    #[test]
    fn test_value_text() {
        let number: UpdateSetRequest =
            serde_json::from_value(json!({"field": "weight", "value": 102.5})).unwrap();
        assert_eq!(number.value_text(), "102.5");
        let cleared: UpdateSetRequest =
            serde_json::from_value(json!({"field": "reps", "value": null})).unwrap();
        assert_eq!(cleared.value_text(), "");
    }

    #[test]
    fn test_move_up_order() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        assert_eq!(move_up_order(&ids, 2), vec![ids[0], ids[2], ids[1]]);
        assert_eq!(move_up_order(&ids, 0), vec![ids[1], ids[2], ids[0]]);
        assert_eq!(move_up_order(&ids, 5), ids);
    }
}
