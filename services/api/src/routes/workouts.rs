//! Scheduled athlete workouts

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use common::error::DatabaseError;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::CoachSession,
    models::workout::{
        AthleteWorkout, AthleteWorkoutRow, CreateWorkoutRequest, UpdateSetRequest,
        WorkoutRangeQuery, move_up_order,
    },
    repositories::WorkoutRepository,
    routes::athletes::load_athlete,
    state::AppState,
};

/// Highest set index accepted by the set editor
pub const MAX_SET_INDEX: usize = 49;

async fn load_workout(state: &AppState, coach_id: Uuid, id: Uuid) -> ApiResult<AthleteWorkoutRow> {
    state
        .workouts
        .find_for_coach(coach_id, id)
        .await?
        .ok_or(ApiError::NotFound("Workout"))
}

pub async fn list_workouts(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(athlete_id): Path<Uuid>,
    Query(range): Query<WorkoutRangeQuery>,
) -> ApiResult<Json<Vec<AthleteWorkout>>> {
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(ApiError::Validation("`from` must not be after `to`".to_string()));
        }
    }
    let athlete = load_athlete(&state, session.coach.id, athlete_id).await?;

    let workouts = state
        .workouts
        .list_for_athlete(athlete.id, range.from, range.to)
        .await?
        .into_iter()
        .map(AthleteWorkout::from)
        .collect();
    Ok(Json(workouts))
}

/// Drop a catalog exercise on a date
pub async fn create_workout(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(athlete_id): Path<Uuid>,
    Json(payload): Json<CreateWorkoutRequest>,
) -> ApiResult<(StatusCode, Json<AthleteWorkout>)> {
    let coach_id = session.coach.id;
    let athlete = load_athlete(&state, coach_id, athlete_id).await?;
    let exercise = state
        .exercises
        .find_visible(coach_id, payload.exercise_id)
        .await?
        .ok_or(ApiError::NotFound("Exercise"))?;

    let row = state
        .workouts
        .insert(athlete.id, payload.date, &exercise)
        .await?;
    Ok((StatusCode::CREATED, Json(AthleteWorkout::from(row))))
}

pub async fn update_set(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<UpdateSetRequest>,
) -> ApiResult<Json<AthleteWorkout>> {
    if index > MAX_SET_INDEX {
        return Err(ApiError::Validation(format!(
            "Set index must be at most {}",
            MAX_SET_INDEX
        )));
    }

    let mut tx = state.db_pool.begin().await.map_err(DatabaseError::from)?;
    let row = WorkoutRepository::find_for_update(&mut tx, session.coach.id, id)
        .await?
        .ok_or(ApiError::NotFound("Workout"))?;
    let mut workout = AthleteWorkout::from(row);
    workout.edit_set(index, payload.field, payload.value_text());

    let row = WorkoutRepository::update_sets(&mut tx, workout.id, &workout.sets).await?;
    tx.commit().await.map_err(DatabaseError::from)?;
    Ok(Json(AthleteWorkout::from(row)))
}

/// Move a workout one place up within its day; the first wraps to the
/// bottom. Returns the day in its new order.
pub async fn move_workout_up(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<AthleteWorkout>>> {
    let workout = load_workout(&state, session.coach.id, id).await?;

    let mut tx = state.db_pool.begin().await.map_err(DatabaseError::from)?;
    let ids = WorkoutRepository::lock_day(&mut tx, workout.athlete_id, workout.date).await?;
    let index = ids
        .iter()
        .position(|other| *other == workout.id)
        .ok_or(ApiError::NotFound("Workout"))?;
    for (position, id) in move_up_order(&ids, index).into_iter().enumerate() {
        WorkoutRepository::set_position(&mut tx, id, position as i32).await?;
    }
    tx.commit().await.map_err(DatabaseError::from)?;

    let day = state
        .workouts
        .list_for_athlete(workout.athlete_id, Some(workout.date), Some(workout.date))
        .await?
        .into_iter()
        .map(AthleteWorkout::from)
        .collect();
    Ok(Json(day))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let workout = load_workout(&state, session.coach.id, id).await?;
    if !state.workouts.delete(workout.id).await? {
        return Err(ApiError::NotFound("Workout"));
    }
    Ok(StatusCode::NO_CONTENT)
}
