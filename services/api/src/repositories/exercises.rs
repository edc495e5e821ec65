//! Exercise catalog repository

use common::error::DatabaseResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::exercise::Exercise;

#[derive(Clone)]
pub struct ExerciseRepository {
    pool: PgPool,
}

impl ExerciseRepository {
    /// Create a new exercise repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Shared catalog plus the coach's own exercises
    pub async fn list_visible(&self, coach_id: Uuid) -> DatabaseResult<Vec<Exercise>> {
        let exercises = sqlx::query_as::<_, Exercise>(
            r#"
            SELECT * FROM exercises
            WHERE coach_id IS NULL OR coach_id = $1
            ORDER BY muscle_group, name
            "#,
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(exercises)
    }

    pub async fn find_visible(&self, coach_id: Uuid, id: Uuid) -> DatabaseResult<Option<Exercise>> {
        let exercise = sqlx::query_as::<_, Exercise>(
            "SELECT * FROM exercises WHERE id = $1 AND (coach_id IS NULL OR coach_id = $2)",
        )
        .bind(id)
        .bind(coach_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exercise)
    }

    pub async fn insert(
        &self,
        coach_id: Uuid,
        name: &str,
        muscle_group: &str,
    ) -> DatabaseResult<Exercise> {
        let exercise = sqlx::query_as::<_, Exercise>(
            r#"
            INSERT INTO exercises (coach_id, name, muscle_group)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(coach_id)
        .bind(name)
        .bind(muscle_group)
        .fetch_one(&self.pool)
        .await?;
        Ok(exercise)
    }

    /// Delete one of the coach's own exercises; shared entries are untouched
    pub async fn delete_own(&self, coach_id: Uuid, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1 AND coach_id = $2")
            .bind(id)
            .bind(coach_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
