//! Checkout and webhook payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCoachRequest {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteAthleteRequest {
    pub email: String,
    pub coach_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Envelope of a payment-provider event
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// The fields of a completed checkout session used to promote a signup
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutSessionObject {
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
}

impl CheckoutSessionObject {
    /// Email the checkout was paid for, preferring the one we passed in
    pub fn email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .or_else(|| self.customer_details.as_ref()?.email.as_deref())
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    pub fn provider_ids(&self) -> CheckoutRecord {
        CheckoutRecord {
            customer_id: self.customer.clone(),
            subscription_id: self.subscription.clone(),
        }
    }
}

/// Provider ids recorded with a completed checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct CheckoutRecord {
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SubscriptionObject {
    pub fn provider_ids(&self) -> CheckoutRecord {
        CheckoutRecord {
            customer_id: self.customer.clone(),
            subscription_id: self.id.clone(),
        }
    }

    /// Status to store for the coach; deletion always reads as canceled
    pub fn effective_status(&self, event_type: &str) -> String {
        if event_type == SUBSCRIPTION_DELETED {
            "canceled".to_string()
        } else {
            self.status.clone().unwrap_or_else(|| "incomplete".to_string())
        }
    }
}
