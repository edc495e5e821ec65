//! Scheduled athlete workout repository

use chrono::NaiveDate;
use common::error::DatabaseResult;
use planner::SetEntry;
use sqlx::{PgConnection, PgPool, types::Json};
use uuid::Uuid;

use crate::models::{exercise::Exercise, workout::AthleteWorkoutRow};

#[derive(Clone)]
pub struct WorkoutRepository {
    pool: PgPool,
}

impl WorkoutRepository {
    /// Create a new workout repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Workouts of one athlete, optionally bounded by inclusive dates
    pub async fn list_for_athlete(
        &self,
        athlete_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DatabaseResult<Vec<AthleteWorkoutRow>> {
        let rows = sqlx::query_as::<_, AthleteWorkoutRow>(
            r#"
            SELECT * FROM athlete_workouts
            WHERE athlete_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            ORDER BY date, position, created_at
            "#,
        )
        .bind(athlete_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// A workout, provided its athlete belongs to the coach
    pub async fn find_for_coach(
        &self,
        coach_id: Uuid,
        id: Uuid,
    ) -> DatabaseResult<Option<AthleteWorkoutRow>> {
        let row = sqlx::query_as::<_, AthleteWorkoutRow>(
            r#"
            SELECT w.* FROM athlete_workouts w
            JOIN athletes a ON a.id = w.athlete_id
            WHERE w.id = $1 AND a.coach_id = $2
            "#,
        )
        .bind(id)
        .bind(coach_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Same as `find_for_coach`, locking the workout row until the
    /// transaction ends
    pub async fn find_for_update(
        conn: &mut PgConnection,
        coach_id: Uuid,
        id: Uuid,
    ) -> DatabaseResult<Option<AthleteWorkoutRow>> {
        let row = sqlx::query_as::<_, AthleteWorkoutRow>(
            r#"
            SELECT w.* FROM athlete_workouts w
            JOIN athletes a ON a.id = w.athlete_id
            WHERE w.id = $1 AND a.coach_id = $2
            FOR UPDATE OF w
            "#,
        )
        .bind(id)
        .bind(coach_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Schedule a catalog exercise at the end of a day with one empty set
    pub async fn insert(
        &self,
        athlete_id: Uuid,
        date: NaiveDate,
        exercise: &Exercise,
    ) -> DatabaseResult<AthleteWorkoutRow> {
        let row = sqlx::query_as::<_, AthleteWorkoutRow>(
            r#"
            INSERT INTO athlete_workouts (athlete_id, date, position, exercise_id, name, muscle_group, sets)
            VALUES (
                $1, $2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM athlete_workouts WHERE athlete_id = $1 AND date = $2),
                $3, $4, $5, $6
            )
            RETURNING *
            "#,
        )
        .bind(athlete_id)
        .bind(date)
        .bind(exercise.id)
        .bind(&exercise.name)
        .bind(&exercise.muscle_group)
        .bind(Json(vec![SetEntry::default()]))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Rewrite the sets column in array form
    pub async fn update_sets(
        conn: &mut PgConnection,
        id: Uuid,
        sets: &[SetEntry],
    ) -> DatabaseResult<AthleteWorkoutRow> {
        let row = sqlx::query_as::<_, AthleteWorkoutRow>(
            r#"
            UPDATE athlete_workouts SET sets = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(sets))
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Ids of an athlete's workouts on one date, in display order, locked
    /// for reordering
    pub async fn lock_day(
        conn: &mut PgConnection,
        athlete_id: Uuid,
        date: NaiveDate,
    ) -> DatabaseResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM athlete_workouts
            WHERE athlete_id = $1 AND date = $2
            ORDER BY position, created_at
            FOR UPDATE
            "#,
        )
        .bind(athlete_id)
        .bind(date)
        .fetch_all(&mut *conn)
        .await?;
        Ok(ids)
    }

    pub async fn set_position(conn: &mut PgConnection, id: Uuid, position: i32) -> DatabaseResult<()> {
        sqlx::query("UPDATE athlete_workouts SET position = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(position)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM athlete_workouts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
