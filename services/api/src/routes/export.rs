//! Weekly report downloads

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use planner::{
    calendar::week_of,
    export::{ExportFormat, render},
    report::{ReportEntry, WeeklyReport},
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    middleware::CoachSession,
    models::workout::AthleteWorkout,
    routes::athletes::load_athlete,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub week_of: Option<NaiveDate>,
}

/// `Content-Disposition` value for a download; quotes are not allowed in the
/// file name
pub fn attachment_header(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name.replace('"', ""))
}

pub async fn export_week(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let today = Utc::now().date_naive();
    let week_date = query.week_of.unwrap_or(today);
    let week = week_of(week_date)?;
    let athlete = load_athlete(&state, session.coach.id, id).await?;

    let mut scheduled: BTreeMap<NaiveDate, Vec<ReportEntry>> = BTreeMap::new();
    for row in state
        .workouts
        .list_for_athlete(athlete.id, Some(week[0]), Some(week[6]))
        .await?
    {
        let workout = AthleteWorkout::from(row);
        scheduled
            .entry(workout.date)
            .or_default()
            .push(workout.report_entry());
    }

    let report = WeeklyReport::build(
        athlete.first_name.as_deref(),
        athlete.last_name.as_deref(),
        session.coach.display_name.as_deref(),
        week_date,
        today,
        &scheduled,
    )?;
    let file = render(&report, query.format)?;
    info!("Exported {} for athlete {}", file.file_name, athlete.id);

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, attachment_header(&file.file_name)),
        ],
        file.bytes,
    )
        .into_response())
}
