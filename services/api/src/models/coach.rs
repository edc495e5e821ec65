//! Coach and pending-signup models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription status that grants dashboard access
pub const ACTIVE_STATUS: &str = "active";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Coach {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub organization_name: Option<String>,
    pub website: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub role: String,
    pub is_free: bool,
    pub stripe_subscription_status: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coach {
    /// Free accounts and active subscriptions may use the dashboard
    pub fn has_access(&self) -> bool {
        self.is_free || self.stripe_subscription_status.as_deref() == Some(ACTIVE_STATUS)
    }
}

/// Optional public profile fields collected at signup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachProfile {
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
}

/// A signup waiting for its checkout to complete
#[derive(Debug, Clone, FromRow)]
pub struct PendingCoach {
    pub email: String,
    pub auth_user_id: Uuid,
    pub display_name: String,
    pub organization_name: Option<String>,
    pub website: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
}

impl PendingCoach {
    pub fn profile(&self) -> CoachProfile {
        CoachProfile {
            organization_name: self.organization_name.clone(),
            website: self.website.clone(),
            facebook: self.facebook.clone(),
            instagram: self.instagram.clone(),
            twitter: self.twitter.clone(),
        }
    }
}

/// Values written when a coach row is created
#[derive(Debug, Clone)]
pub struct NewCoach {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub profile: CoachProfile,
    pub subscription_status: Option<String>,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(flatten)]
    pub profile: CoachProfile,
}
