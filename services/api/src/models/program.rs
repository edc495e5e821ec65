//! Program models

use chrono::{DateTime, Utc};
use planner::ProgramData;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Program {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub name: String,
    pub data: Json<ProgramData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of program create and update
#[derive(Debug, Deserialize)]
pub struct SaveProgramRequest {
    pub name: String,
    #[serde(default)]
    pub data: ProgramData,
}
