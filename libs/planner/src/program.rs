//! Program structure: weeks of seven day slots, each an ordered workout list

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::workout::{de_lenient_string, de_lenient_u32};

/// Number of day slots in a program week
pub const DAYS_PER_WEEK: usize = 7;

/// A program template as stored in `programs.data` and snapshotted on athletes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramData {
    #[serde(default)]
    pub weeks: Vec<Week>,
}

/// One program week
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Week {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub days: Days,
}

/// Seven day slots. Slot 0 is the first day of the week relative to the
/// program start date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Days([Vec<ProgramWorkout>; DAYS_PER_WEEK]);

/// A planned exercise within a day slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramWorkout {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub exercise: String,
    #[serde(default)]
    pub sets: Vec<ProgramSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A planned set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramSet {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
}

impl ProgramData {
    /// Number of calendar days the program covers
    pub fn total_days(&self) -> usize {
        self.weeks.len() * DAYS_PER_WEEK
    }

    /// True when at least one slot of any week holds a workout
    pub fn has_any_workouts(&self) -> bool {
        self.weeks
            .iter()
            .any(|week| week.days.iter().any(|day| !day.is_empty()))
    }

    /// Workouts in the given slot, empty when the slot does not exist
    pub fn day(&self, week: usize, day: usize) -> &[ProgramWorkout] {
        self.weeks
            .get(week)
            .and_then(|w| w.days.get(day))
            .unwrap_or(&[])
    }
}

impl Week {
    /// An empty week with the given id
    pub fn empty(id: u32) -> Self {
        Self {
            id,
            days: Days::default(),
        }
    }
}

impl Days {
    pub fn get(&self, day: usize) -> Option<&[ProgramWorkout]> {
        self.0.get(day).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, day: usize) -> Option<&mut Vec<ProgramWorkout>> {
        self.0.get_mut(day)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<ProgramWorkout>> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vec<ProgramWorkout>> {
        self.0.iter_mut()
    }
}

impl From<[Vec<ProgramWorkout>; DAYS_PER_WEEK]> for Days {
    fn from(slots: [Vec<ProgramWorkout>; DAYS_PER_WEEK]) -> Self {
        Self(slots)
    }
}

impl Serialize for Days {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// Stored `days` come either as an array of slots or as an object keyed by
/// slot index ("0".."6"). Missing or null slots read as empty.
#[derive(Deserialize)]
#[serde(untagged)]
enum DaysRepr {
    List(Vec<Option<Vec<ProgramWorkout>>>),
    Map(BTreeMap<String, Option<Vec<ProgramWorkout>>>),
}

impl<'de> Deserialize<'de> for Days {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let mut days = Days::default();
        match DaysRepr::deserialize(deserializer)? {
            DaysRepr::List(slots) => {
                if slots.len() > DAYS_PER_WEEK {
                    return Err(D::Error::custom(format!(
                        "a week has {} day slots, got {}",
                        DAYS_PER_WEEK,
                        slots.len()
                    )));
                }
                for (idx, slot) in slots.into_iter().enumerate() {
                    days.0[idx] = slot.unwrap_or_default();
                }
            }
            DaysRepr::Map(slots) => {
                for (key, slot) in slots {
                    let idx: usize = key
                        .parse()
                        .map_err(|_| D::Error::custom(format!("invalid day key {:?}", key)))?;
                    let target = days.0.get_mut(idx).ok_or_else(|| {
                        D::Error::custom(format!("day index {} out of range", idx))
                    })?;
                    *target = slot.unwrap_or_default();
                }
            }
        }
        Ok(days)
    }
}
