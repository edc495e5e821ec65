//! Athlete repository

use chrono::NaiveDate;
use common::error::DatabaseResult;
use planner::ProgramData;
use sqlx::{PgConnection, PgPool, types::Json};
use uuid::Uuid;

use crate::models::athlete::{Athlete, NewAthlete, UpdateAthleteRequest};

#[derive(Clone)]
pub struct AthleteRepository {
    pool: PgPool,
}

impl AthleteRepository {
    /// Create a new athlete repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All athletes of a coach, by name
    pub async fn list_for_coach(&self, coach_id: Uuid) -> DatabaseResult<Vec<Athlete>> {
        let athletes = sqlx::query_as::<_, Athlete>(
            r#"
            SELECT * FROM athletes
            WHERE coach_id = $1
            ORDER BY lower(coalesce(first_name, '')), lower(coalesce(last_name, '')), created_at
            "#,
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(athletes)
    }

    pub async fn find(&self, coach_id: Uuid, id: Uuid) -> DatabaseResult<Option<Athlete>> {
        let athlete =
            sqlx::query_as::<_, Athlete>("SELECT * FROM athletes WHERE id = $1 AND coach_id = $2")
                .bind(id)
                .bind(coach_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(athlete)
    }

    /// Insert an athlete with fresh counters and no program. The id is
    /// generated when not supplied.
    pub async fn insert(&self, athlete: &NewAthlete) -> DatabaseResult<Athlete> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            INSERT INTO athletes (
                id, coach_id, status, first_name, last_name, email,
                sessions_7d, adherence_pct, weekly_volume
            )
            VALUES (COALESCE($1, gen_random_uuid()), $2, 'invited', $3, $4, $5, 0, 100, 0)
            RETURNING *
            "#,
        )
        .bind(athlete.id)
        .bind(athlete.coach_id)
        .bind(&athlete.first_name)
        .bind(&athlete.last_name)
        .bind(&athlete.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(athlete)
    }

    /// Apply a profile patch; `None` fields keep their stored value
    pub async fn update_profile(
        &self,
        coach_id: Uuid,
        id: Uuid,
        patch: &UpdateAthleteRequest,
    ) -> DatabaseResult<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            UPDATE athletes SET
                status = COALESCE($3, status),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                email = COALESCE($6, email),
                phone = COALESCE($7, phone),
                height_cm = COALESCE($8, height_cm),
                weight_kg = COALESCE($9, weight_kg),
                date_of_birth = COALESCE($10, date_of_birth),
                notes = COALESCE($11, notes),
                athlete_group = COALESCE($12, athlete_group),
                updated_at = NOW()
            WHERE id = $1 AND coach_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(coach_id)
        .bind(patch.status)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(patch.height_cm)
        .bind(patch.weight_kg)
        .bind(patch.date_of_birth)
        .bind(&patch.notes)
        .bind(&patch.athlete_group)
        .fetch_optional(&self.pool)
        .await?;
        Ok(athlete)
    }

    pub async fn set_avatar(
        &self,
        coach_id: Uuid,
        id: Uuid,
        avatar_url: &str,
    ) -> DatabaseResult<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            UPDATE athletes SET avatar_url = $3, updated_at = NOW()
            WHERE id = $1 AND coach_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(coach_id)
        .bind(avatar_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(athlete)
    }

    /// Store a program assignment with its snapshot
    pub async fn assign_program(
        conn: &mut PgConnection,
        coach_id: Uuid,
        id: Uuid,
        program_id: Uuid,
        start: NaiveDate,
        end: Option<NaiveDate>,
        snapshot: &ProgramData,
    ) -> DatabaseResult<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            UPDATE athletes SET
                program_id = $3,
                program_start_date = $4,
                program_end_date = $5,
                program_data = $6,
                updated_at = NOW()
            WHERE id = $1 AND coach_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(coach_id)
        .bind(program_id)
        .bind(start)
        .bind(end)
        .bind(Json(snapshot))
        .fetch_optional(&mut *conn)
        .await?;
        Ok(athlete)
    }

    /// Remove the program, its window and its snapshot
    pub async fn clear_program(&self, coach_id: Uuid, id: Uuid) -> DatabaseResult<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            UPDATE athletes SET
                program_id = NULL,
                program_start_date = NULL,
                program_end_date = NULL,
                program_data = NULL,
                updated_at = NOW()
            WHERE id = $1 AND coach_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(coach_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(athlete)
    }

    /// Unassign a program from every athlete of the coach that follows it.
    /// Returns the number of athletes cleared.
    pub async fn clear_program_for_all(
        conn: &mut PgConnection,
        coach_id: Uuid,
        program_id: Uuid,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE athletes SET
                program_id = NULL,
                program_start_date = NULL,
                program_end_date = NULL,
                program_data = NULL,
                updated_at = NOW()
            WHERE coach_id = $1 AND program_id = $2
            "#,
        )
        .bind(coach_id)
        .bind(program_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
