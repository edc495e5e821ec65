//! Program templates and builder edits

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use common::error::DatabaseError;
use planner::{ProgramData, builder};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::CoachSession,
    models::program::{Program, SaveProgramRequest},
    repositories::{AthleteRepository, ProgramRepository},
    state::AppState,
    validation::validate_program_name,
};

fn duplicate_name(name: &str) -> ApiError {
    ApiError::Conflict(format!("A program named \"{}\" already exists", name))
}

fn map_unique(e: DatabaseError, name: &str) -> ApiError {
    if e.is_unique_violation() {
        duplicate_name(name)
    } else {
        ApiError::Database(e)
    }
}

/// Trimmed name and structure, or the reason they cannot be saved
async fn validated(
    state: &AppState,
    coach_id: Uuid,
    payload: &SaveProgramRequest,
    exclude: Option<Uuid>,
) -> ApiResult<String> {
    let name = validate_program_name(&payload.name).map_err(ApiError::Validation)?;
    if !payload.data.has_any_workouts() {
        return Err(ApiError::Validation(
            "Add at least one workout before saving".to_string(),
        ));
    }
    if state.programs.name_taken(coach_id, &name, exclude).await? {
        return Err(duplicate_name(&name));
    }
    Ok(name)
}

async fn load_program(state: &AppState, coach_id: Uuid, id: Uuid) -> ApiResult<Program> {
    state
        .programs
        .find(coach_id, id)
        .await?
        .ok_or(ApiError::NotFound("Program"))
}

/// Apply a builder edit to a stored program and save the result. The row
/// stays locked between the read and the write.
async fn edit_program<F>(state: &AppState, coach_id: Uuid, id: Uuid, edit: F) -> ApiResult<Program>
where
    F: FnOnce(&mut ProgramData) -> ApiResult<()>,
{
    let mut tx = state.db_pool.begin().await.map_err(DatabaseError::from)?;
    let mut program = ProgramRepository::find_for_update(&mut tx, coach_id, id)
        .await?
        .ok_or(ApiError::NotFound("Program"))?;
    edit(&mut program.data.0)?;
    let program = ProgramRepository::update_data(&mut tx, coach_id, id, &program.data.0)
        .await?
        .ok_or(ApiError::NotFound("Program"))?;
    tx.commit().await.map_err(DatabaseError::from)?;
    Ok(program)
}

pub async fn list_programs(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
) -> ApiResult<Json<Vec<Program>>> {
    Ok(Json(state.programs.list(session.coach.id).await?))
}

pub async fn get_program(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Program>> {
    Ok(Json(load_program(&state, session.coach.id, id).await?))
}

pub async fn create_program(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Json(payload): Json<SaveProgramRequest>,
) -> ApiResult<(StatusCode, Json<Program>)> {
    let coach_id = session.coach.id;
    let name = validated(&state, coach_id, &payload, None).await?;

    let program = state
        .programs
        .insert(coach_id, &name, &payload.data)
        .await
        .map_err(|e| map_unique(e, &name))?;

    info!("Coach {} created program {}", coach_id, program.id);
    Ok((StatusCode::CREATED, Json(program)))
}

pub async fn update_program(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveProgramRequest>,
) -> ApiResult<Json<Program>> {
    let coach_id = session.coach.id;
    let name = validated(&state, coach_id, &payload, Some(id)).await?;

    let program = state
        .programs
        .update(coach_id, id, &name, &payload.data)
        .await
        .map_err(|e| map_unique(e, &name))?
        .ok_or(ApiError::NotFound("Program"))?;
    Ok(Json(program))
}

/// Delete a program and unassign it from the athletes following it, so no
/// athlete keeps a window and snapshot without a program
pub async fn delete_program(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let coach_id = session.coach.id;

    let mut tx = state.db_pool.begin().await.map_err(DatabaseError::from)?;
    let cleared = AthleteRepository::clear_program_for_all(&mut tx, coach_id, id).await?;
    if !ProgramRepository::delete(&mut tx, coach_id, id).await? {
        return Err(ApiError::NotFound("Program"));
    }
    tx.commit().await.map_err(DatabaseError::from)?;

    info!("Coach {} deleted program {}, unassigned from {} athletes", coach_id, id, cleared);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_week(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Program>> {
    let program = edit_program(&state, session.coach.id, id, |data| {
        builder::add_week(data);
        Ok(())
    })
    .await?;
    Ok(Json(program))
}

pub async fn duplicate_week(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path((id, week)): Path<(Uuid, usize)>,
) -> ApiResult<Json<Program>> {
    let program = edit_program(&state, session.coach.id, id, |data| {
        builder::duplicate_week(data, week)?;
        Ok(())
    })
    .await?;
    Ok(Json(program))
}

pub async fn clear_day(
    State(state): State<AppState>,
    Extension(session): Extension<CoachSession>,
    Path((id, week, day)): Path<(Uuid, usize, usize)>,
) -> ApiResult<Json<Program>> {
    let program = edit_program(&state, session.coach.id, id, |data| {
        Ok(builder::clear_day(data, week, day)?)
    })
    .await?;
    Ok(Json(program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError as SqlxDatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    /// Driver error carrying Postgres' unique-violation code
    #[derive(Debug)]
    struct UniqueViolation;

    impl fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl StdError for UniqueViolation {}

    impl SqlxDatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23505"))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let error = DatabaseError::Query(sqlx::Error::Database(Box::new(UniqueViolation)));
        let mapped = map_unique(error, "Strength Block");

        assert!(matches!(mapped, ApiError::Conflict(_)));
        assert_eq!(mapped.status(), StatusCode::CONFLICT);
        assert_eq!(
            mapped.to_string(),
            duplicate_name("Strength Block").to_string()
        );
    }

    #[test]
    fn test_other_database_errors_are_not_conflicts() {
        let mapped = map_unique(DatabaseError::Query(sqlx::Error::RowNotFound), "Base");
        assert!(matches!(mapped, ApiError::Database(_)));
        assert_eq!(mapped.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
