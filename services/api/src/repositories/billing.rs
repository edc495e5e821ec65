//! Pending signups and processed payment events

use common::error::DatabaseResult;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{
    billing::{CHECKOUT_COMPLETED, CheckoutRecord},
    coach::{CoachProfile, PendingCoach},
};

#[derive(Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    /// Create a new billing repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the pending signup for an email
    pub async fn find_pending(&self, email: &str) -> DatabaseResult<Option<PendingCoach>> {
        let pending = sqlx::query_as::<_, PendingCoach>(
            "SELECT * FROM pending_coaches WHERE email = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pending)
    }

    /// Create or refresh the pending signup for an email
    pub async fn upsert_pending(
        &self,
        email: &str,
        auth_user_id: Uuid,
        display_name: &str,
        profile: &CoachProfile,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pending_coaches (
                email, auth_user_id, display_name, organization_name, website, facebook,
                instagram, twitter
            )
            VALUES (lower($1), $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO UPDATE SET
                auth_user_id = EXCLUDED.auth_user_id,
                display_name = EXCLUDED.display_name,
                organization_name = EXCLUDED.organization_name,
                website = EXCLUDED.website,
                facebook = EXCLUDED.facebook,
                instagram = EXCLUDED.instagram,
                twitter = EXCLUDED.twitter
            "#,
        )
        .bind(email)
        .bind(auth_user_id)
        .bind(display_name)
        .bind(&profile.organization_name)
        .bind(&profile.website)
        .bind(&profile.facebook)
        .bind(&profile.instagram)
        .bind(&profile.twitter)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Lock the pending signup for an email until the transaction ends
    pub async fn lock_pending(
        conn: &mut PgConnection,
        email: &str,
    ) -> DatabaseResult<Option<PendingCoach>> {
        let pending = sqlx::query_as::<_, PendingCoach>(
            "SELECT * FROM pending_coaches WHERE email = lower($1) FOR UPDATE",
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(pending)
    }

    pub async fn delete_pending(conn: &mut PgConnection, email: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM pending_coaches WHERE email = lower($1)")
            .bind(email)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a processed event. Returns false when the event id was already
    /// recorded, meaning this delivery is a repeat.
    pub async fn record_event(
        conn: &mut PgConnection,
        event_id: &str,
        event_type: &str,
        email: Option<&str>,
        ids: &CheckoutRecord,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO billing_events (event_id, event_type, email, customer_id, subscription_id)
            VALUES ($1, $2, lower($3), $4, $5)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(event_type)
        .bind(email)
        .bind(&ids.customer_id)
        .bind(&ids.subscription_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Provider ids of the latest completed checkout recorded for the email
    pub async fn completed_checkout(&self, email: &str) -> DatabaseResult<Option<CheckoutRecord>> {
        let record = sqlx::query_as::<_, CheckoutRecord>(
            r#"
            SELECT customer_id, subscription_id FROM billing_events
            WHERE lower(email) = lower($1) AND event_type = $2
            ORDER BY processed_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(CHECKOUT_COMPLETED)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}
