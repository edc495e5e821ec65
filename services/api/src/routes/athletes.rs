//! Athlete roster, profile, avatar and program assignment

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::Utc;
use common::error::DatabaseError;
use planner::ProgramWindow;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::CoachSession,
    models::athlete::{
        AssignProgramRequest, Athlete, AthleteListQuery, AthleteListResponse, NewAthlete,
        QuickAddAthleteRequest, UpdateAthleteRequest,
    },
    repositories::{AthleteRepository, ProgramRepository},
    state::AppState,
    validation::{normalize_email, validate_email},
};

/// Largest accepted avatar upload
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// File extension for an accepted avatar content type
pub fn avatar_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    match mime.to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

pub(crate) async fn load_athlete(state: &AppState, coach_id: Uuid, id: Uuid) -> ApiResult<Athlete> {
    state
        .athletes
        .find(coach_id, id)
        .await?
        .ok_or(ApiError::NotFound("Athlete"))
}

fn optional_email(email: Option<&str>) -> ApiResult<Option<String>> {
    match email.map(normalize_email).filter(|e| !e.is_empty()) {
        Some(email) => {
            validate_email(&email).map_err(ApiError::Validation)?;
            Ok(Some(email))
        }
        None => Ok(None),
    }
}

pub async fn list_athletes(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Query(query): Query<AthleteListQuery>,
) -> ApiResult<Json<AthleteListResponse>> {
    let athletes = state.athletes.list_for_coach(session.coach.id).await?;
    Ok(Json(AthleteListResponse::build(athletes, &query)))
}

/// Quick add from the roster page
pub async fn create_athlete(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Json(payload): Json<QuickAddAthleteRequest>,
) -> ApiResult<(StatusCode, Json<Athlete>)> {
    let first_name = payload.first_name.trim();
    let last_name = payload.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(ApiError::Validation(
            "First and last name are required".to_string(),
        ));
    }
    let email = optional_email(payload.email.as_deref())?;

    let athlete = state
        .athletes
        .insert(&NewAthlete {
            id: None,
            coach_id: session.coach.id,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(athlete)))
}

pub async fn get_athlete(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Athlete>> {
    Ok(Json(load_athlete(&state, session.coach.id, id).await?))
}

pub async fn update_athlete(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateAthleteRequest>,
) -> ApiResult<Json<Athlete>> {
    payload.email = optional_email(payload.email.as_deref())?;
    for value in [payload.height_cm, payload.weight_kg].into_iter().flatten() {
        if !value.is_finite() || value <= 0.0 {
            return Err(ApiError::Validation(
                "Height and weight must be positive numbers".to_string(),
            ));
        }
    }

    let athlete = state
        .athletes
        .update_profile(session.coach.id, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Athlete"))?;
    Ok(Json(athlete))
}

/// Store the raw image body in the avatar bucket and save its public URL
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Athlete>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let extension = avatar_extension(content_type).ok_or_else(|| {
        ApiError::Validation("Avatar must be a PNG, JPEG, WebP or GIF image".to_string())
    })?;
    if body.is_empty() {
        return Err(ApiError::Validation("Avatar image is empty".to_string()));
    }
    if body.len() > MAX_AVATAR_BYTES {
        return Err(ApiError::Validation("Avatar image is too large".to_string()));
    }

    let athlete = load_athlete(&state, session.coach.id, id).await?;
    let path = format!("{}-{}.{}", athlete.id, Utc::now().timestamp_millis(), extension);
    let url = state
        .supabase
        .upload_public_object(&state.settings.avatar_bucket, &path, content_type, body.to_vec())
        .await?;

    let athlete = state
        .athletes
        .set_avatar(session.coach.id, id, &url)
        .await?
        .ok_or(ApiError::NotFound("Athlete"))?;
    Ok(Json(athlete))
}

/// Assign a program, copying its current structure onto the athlete
pub async fn assign_program(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignProgramRequest>,
) -> ApiResult<Json<Athlete>> {
    let window = ProgramWindow::new(payload.start_date, payload.end_date)?;
    let coach_id = session.coach.id;

    let mut tx = state.db_pool.begin().await.map_err(DatabaseError::from)?;
    let program = ProgramRepository::find_for_share(&mut tx, coach_id, payload.program_id)
        .await?
        .ok_or(ApiError::NotFound("Program"))?;
    let athlete = AthleteRepository::assign_program(
        &mut tx,
        coach_id,
        id,
        program.id,
        window.start(),
        window.end(),
        &program.data.0,
    )
    .await?
    .ok_or(ApiError::NotFound("Athlete"))?;
    tx.commit().await.map_err(DatabaseError::from)?;

    info!("Assigned program {} to athlete {} from {}", program.id, id, window.start());
    Ok(Json(athlete))
}

pub async fn unassign_program(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Athlete>> {
    let athlete = state
        .athletes
        .clear_program(session.coach.id, id)
        .await?
        .ok_or(ApiError::NotFound("Athlete"))?;
    Ok(Json(athlete))
}
