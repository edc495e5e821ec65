//! Coach repository

use common::error::DatabaseResult;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{
    billing::CheckoutRecord,
    coach::{Coach, NewCoach},
};

#[derive(Clone)]
pub struct CoachRepository {
    pool: PgPool,
}

impl CoachRepository {
    /// Create a new coach repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a coach by auth identity id
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Coach>> {
        let coach = sqlx::query_as::<_, Coach>("SELECT * FROM coaches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(coach)
    }

    /// Find a coach by email, ignoring case
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<Coach>> {
        let coach =
            sqlx::query_as::<_, Coach>("SELECT * FROM coaches WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(coach)
    }

    /// Insert a coach unless one already exists for the id or email.
    /// Returns whether a row was written.
    pub async fn insert(conn: &mut PgConnection, coach: &NewCoach) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO coaches (
                id, email, display_name, organization_name, website, facebook, instagram,
                twitter, role, stripe_subscription_status, stripe_customer_id,
                stripe_subscription_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'coach', $9, $10, $11)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(coach.id)
        .bind(&coach.email)
        .bind(&coach.display_name)
        .bind(&coach.profile.organization_name)
        .bind(&coach.profile.website)
        .bind(&coach.profile.facebook)
        .bind(&coach.profile.instagram)
        .bind(&coach.profile.twitter)
        .bind(&coach.subscription_status)
        .bind(&coach.customer_id)
        .bind(&coach.subscription_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach provider ids and an active status to an existing coach,
    /// keeping ids already on record when the new ones are missing
    pub async fn attach_billing(
        conn: &mut PgConnection,
        email: &str,
        ids: &CheckoutRecord,
        status: &str,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE coaches SET
                stripe_customer_id = COALESCE($2, stripe_customer_id),
                stripe_subscription_id = COALESCE($3, stripe_subscription_id),
                stripe_subscription_status = $4,
                updated_at = NOW()
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .bind(&ids.customer_id)
        .bind(&ids.subscription_id)
        .bind(status)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Update the subscription status of the coach billed under the
    /// customer or subscription id
    pub async fn set_subscription_status(
        conn: &mut PgConnection,
        ids: &CheckoutRecord,
        status: &str,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE coaches
            SET stripe_subscription_status = $3, updated_at = NOW()
            WHERE ($1::text IS NOT NULL AND stripe_customer_id = $1)
               OR ($2::text IS NOT NULL AND stripe_subscription_id = $2)
            "#,
        )
        .bind(&ids.customer_id)
        .bind(&ids.subscription_id)
        .bind(status)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}
