//! Exercise catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog entry; `coach_id` is `None` for the shared catalog
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub coach_id: Option<Uuid>,
    pub name: String,
    pub muscle_group: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
}
