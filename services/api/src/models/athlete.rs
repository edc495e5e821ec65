//! Athlete models and list filtering

use chrono::{DateTime, NaiveDate, Utc};
use planner::{Assignment, ProgramData};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "athlete_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AthleteStatus {
    Invited,
    Active,
    Paused,
    Archived,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Athlete {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub status: AthleteStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub notes: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(rename = "group")]
    pub athlete_group: Option<String>,
    pub sessions_7d: i32,
    pub adherence_pct: i32,
    pub weekly_volume: i32,
    pub last_session_at: Option<DateTime<Utc>>,
    pub program_id: Option<Uuid>,
    pub program_start_date: Option<NaiveDate>,
    pub program_end_date: Option<NaiveDate>,
    pub program_data: Option<Json<ProgramData>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Athlete {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    pub fn has_program(&self) -> bool {
        self.program_id.is_some()
    }

    /// The assigned program snapshot with its window, when fully assigned.
    /// A window or snapshot left behind without a program schedules nothing.
    pub fn assignment(&self) -> Option<Assignment<'_>> {
        self.program_id?;
        Assignment::from_parts(
            self.program_start_date,
            self.program_end_date,
            self.program_data.as_ref().map(|data| &data.0),
        )
    }
}

/// Athlete list tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AthleteFilter {
    #[default]
    All,
    /// Has a program assigned
    Active,
    /// No program assigned
    Inactive,
    Archived,
}

impl AthleteFilter {
    pub fn matches(self, athlete: &Athlete) -> bool {
        match self {
            AthleteFilter::All => true,
            AthleteFilter::Active => athlete.has_program(),
            AthleteFilter::Inactive => !athlete.has_program(),
            AthleteFilter::Archived => athlete.status == AthleteStatus::Archived,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AthleteListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub filter: AthleteFilter,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct AthleteCounts {
    pub all: usize,
    pub active: usize,
    pub inactive: usize,
    pub archived: usize,
}

#[derive(Debug, Serialize)]
pub struct AthleteListResponse {
    pub athletes: Vec<Athlete>,
    pub counts: AthleteCounts,
}

impl AthleteListResponse {
    /// Apply the name search, count each tab over the search results, then
    /// keep the athletes of the selected tab
    pub fn build(athletes: Vec<Athlete>, query: &AthleteListQuery) -> Self {
        let needle = query
            .q
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let searched: Vec<Athlete> = athletes
            .into_iter()
            .filter(|a| {
                needle
                    .as_deref()
                    .is_none_or(|n| a.full_name().to_lowercase().contains(n))
            })
            .collect();

        let count = |filter: AthleteFilter| searched.iter().filter(|a| filter.matches(a)).count();
        let counts = AthleteCounts {
            all: searched.len(),
            active: count(AthleteFilter::Active),
            inactive: count(AthleteFilter::Inactive),
            archived: count(AthleteFilter::Archived),
        };

        let athletes = searched
            .into_iter()
            .filter(|a| query.filter.matches(a))
            .collect();

        Self { athletes, counts }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuickAddAthleteRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Profile patch; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAthleteRequest {
    pub status: Option<AthleteStatus>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(rename = "group")]
    pub athlete_group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignProgramRequest {
    pub program_id: Uuid,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Values written when an athlete row is created
#[derive(Debug, Clone)]
pub struct NewAthlete {
    pub id: Option<Uuid>,
    pub coach_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn athlete(first: &str, last: &str) -> Athlete {
        Athlete {
            id: Uuid::new_v4(),
            coach_id: Uuid::nil(),
            status: AthleteStatus::Active,
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email: None,
            phone: None,
            height_cm: None,
            weight_kg: None,
            date_of_birth: None,
            notes: None,
            avatar_url: None,
            athlete_group: None,
            sessions_7d: 0,
            adherence_pct: 100,
            weekly_volume: 0,
            last_session_at: None,
            program_id: None,
            program_start_date: None,
            program_end_date: None,
            program_data: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
