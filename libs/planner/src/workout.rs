//! Set data recorded on scheduled athlete workouts
//!
//! Values are free-form: coaches type "3", "8-10", "80%" or "100kg", and
//! older rows stored numbers or a JSON-encoded string instead of an array.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One set row of a scheduled workout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEntry {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub sets: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub reps: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub weight: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub percent: String,
}

/// Editable fields of a [`SetEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetField {
    Sets,
    Reps,
    Weight,
    Percent,
}

impl SetEntry {
    pub fn set(&mut self, field: SetField, value: String) {
        match field {
            SetField::Sets => self.sets = value,
            SetField::Reps => self.reps = value,
            SetField::Weight => self.weight = value,
            SetField::Percent => self.percent = value,
        }
    }

    /// Load column: the weight when present, else the percentage
    pub fn load(&self) -> &str {
        if self.weight.trim().is_empty() {
            &self.percent
        } else {
            &self.weight
        }
    }

    pub fn is_blank(&self) -> bool {
        [&self.sets, &self.reps, &self.weight, &self.percent]
            .iter()
            .all(|v| v.trim().is_empty())
    }
}

/// Decode a stored `sets` column.
///
/// Accepts an array of set objects, or a string holding such an array. Any
/// other shape reads as a single blank set, the same starting point a freshly
/// scheduled workout gets.
pub fn parse_sets(value: &Value) -> Vec<SetEntry> {
    let decoded = match value {
        Value::Array(_) => serde_json::from_value::<Vec<SetEntry>>(value.clone()).ok(),
        Value::String(raw) => serde_json::from_str::<Vec<SetEntry>>(raw).ok(),
        _ => None,
    };

    decoded.unwrap_or_else(|| vec![SetEntry::default()])
}

/// Deserialize a string that may have been stored as a number, bool or null
pub(crate) fn de_lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Deserialize a count that may have been stored as a numeric string
pub(crate) fn de_lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
