//! Exercise catalog

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::CoachSession,
    models::exercise::{CreateExerciseRequest, Exercise},
    state::AppState,
};

const DEFAULT_MUSCLE_GROUP: &str = "General";

pub async fn list_exercises(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
) -> ApiResult<Json<Vec<Exercise>>> {
    Ok(Json(state.exercises.list_visible(session.coach.id).await?))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Json(payload): Json<CreateExerciseRequest>,
) -> ApiResult<(StatusCode, Json<Exercise>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Exercise name is required".to_string()));
    }
    let muscle_group = payload
        .muscle_group
        .as_deref()
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .unwrap_or(DEFAULT_MUSCLE_GROUP);

    let exercise = state
        .exercises
        .insert(session.coach.id, name, muscle_group)
        .await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

/// Delete one of the coach's own exercises
pub async fn delete_exercise(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.exercises.delete_own(session.coach.id, id).await? {
        return Err(ApiError::NotFound("Exercise"));
    }
    Ok(StatusCode::NO_CONTENT)
}
