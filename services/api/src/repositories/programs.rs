//! Program repository

use common::error::DatabaseResult;
use planner::ProgramData;
use sqlx::{PgConnection, PgPool, types::Json};
use uuid::Uuid;

use crate::models::program::Program;

#[derive(Clone)]
pub struct ProgramRepository {
    pool: PgPool,
}

impl ProgramRepository {
    /// Create a new program repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, coach_id: Uuid) -> DatabaseResult<Vec<Program>> {
        let programs = sqlx::query_as::<_, Program>(
            "SELECT * FROM programs WHERE coach_id = $1 ORDER BY lower(name)",
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(programs)
    }

    pub async fn find(&self, coach_id: Uuid, id: Uuid) -> DatabaseResult<Option<Program>> {
        let program =
            sqlx::query_as::<_, Program>("SELECT * FROM programs WHERE id = $1 AND coach_id = $2")
                .bind(id)
                .bind(coach_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(program)
    }

    /// Read a program and hold it against concurrent edits until the
    /// transaction ends
    pub async fn find_for_share(
        conn: &mut PgConnection,
        coach_id: Uuid,
        id: Uuid,
    ) -> DatabaseResult<Option<Program>> {
        let program = sqlx::query_as::<_, Program>(
            "SELECT * FROM programs WHERE id = $1 AND coach_id = $2 FOR SHARE",
        )
        .bind(id)
        .bind(coach_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(program)
    }

    /// Read a program and lock it for a read-modify-write edit
    pub async fn find_for_update(
        conn: &mut PgConnection,
        coach_id: Uuid,
        id: Uuid,
    ) -> DatabaseResult<Option<Program>> {
        let program = sqlx::query_as::<_, Program>(
            "SELECT * FROM programs WHERE id = $1 AND coach_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(coach_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(program)
    }

    /// True when another program of the coach already uses the name,
    /// compared trimmed and case-insensitively
    pub async fn name_taken(
        &self,
        coach_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> DatabaseResult<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM programs
                WHERE coach_id = $1
                  AND lower(btrim(name)) = lower(btrim($2))
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(coach_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn insert(
        &self,
        coach_id: Uuid,
        name: &str,
        data: &ProgramData,
    ) -> DatabaseResult<Program> {
        let program = sqlx::query_as::<_, Program>(
            r#"
            INSERT INTO programs (coach_id, name, data)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(coach_id)
        .bind(name)
        .bind(Json(data))
        .fetch_one(&self.pool)
        .await?;
        Ok(program)
    }

    pub async fn update(
        &self,
        coach_id: Uuid,
        id: Uuid,
        name: &str,
        data: &ProgramData,
    ) -> DatabaseResult<Option<Program>> {
        let program = sqlx::query_as::<_, Program>(
            r#"
            UPDATE programs SET name = $3, data = $4, updated_at = NOW()
            WHERE id = $1 AND coach_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(coach_id)
        .bind(name)
        .bind(Json(data))
        .fetch_optional(&self.pool)
        .await?;
        Ok(program)
    }

    /// Replace only the structure, used by the builder edits
    pub async fn update_data(
        conn: &mut PgConnection,
        coach_id: Uuid,
        id: Uuid,
        data: &ProgramData,
    ) -> DatabaseResult<Option<Program>> {
        let program = sqlx::query_as::<_, Program>(
            r#"
            UPDATE programs SET data = $3, updated_at = NOW()
            WHERE id = $1 AND coach_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(coach_id)
        .bind(Json(data))
        .fetch_optional(&mut *conn)
        .await?;
        Ok(program)
    }

    pub async fn delete(conn: &mut PgConnection, coach_id: Uuid, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1 AND coach_id = $2")
            .bind(id)
            .bind(coach_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
