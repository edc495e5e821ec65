//! Client for the hosted auth and storage APIs
//!
//! Every call authenticates with the service-role key. Identity management
//! (creating users, invitations, confirming emails) stays with the provider;
//! this service only keeps the returned user ids.

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status {status}: {message}")]
    Api { status: u16, message: String },
}

pub type SupabaseResult<T> = Result<T, SupabaseError>;

/// The part of a provider user record this service uses
#[derive(Debug, Clone, Deserialize)]
pub struct AuthIdentity {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(http: Client, base_url: &str, service_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn check(response: Response) -> SupabaseResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
            })
            .unwrap_or(body);
        warn!("Supabase returned {}: {}", status, message);
        Err(SupabaseError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Create a password identity whose email is not yet confirmed
    pub async fn create_unconfirmed_user(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> SupabaseResult<AuthIdentity> {
        let url = format!("{}/auth/v1/admin/users", self.base_url);
        let response = self
            .authorized(self.http.post(url))
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": false,
                "user_metadata": metadata,
            }))
            .send()
            .await?;

        let identity = Self::check(response).await?.json::<AuthIdentity>().await?;
        debug!("Created auth identity {} for {}", identity.id, email);
        Ok(identity)
    }

    /// Apply admin attributes to an existing identity
    pub async fn update_user(&self, id: Uuid, attributes: Value) -> SupabaseResult<()> {
        let url = format!("{}/auth/v1/admin/users/{}", self.base_url, id);
        let response = self
            .authorized(self.http.put(url))
            .json(&attributes)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Mark the identity's email as confirmed so it can sign in
    pub async fn confirm_email(&self, id: Uuid) -> SupabaseResult<()> {
        self.update_user(id, json!({ "email_confirm": true })).await
    }

    /// Send an invitation email and return the invited identity
    pub async fn invite_user(&self, email: &str, data: Value) -> SupabaseResult<AuthIdentity> {
        let url = format!("{}/auth/v1/invite", self.base_url);
        let response = self
            .authorized(self.http.post(url))
            .json(&json!({ "email": email, "data": data }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<AuthIdentity>().await?)
    }

    /// Upload (or overwrite) an object and return its public URL
    pub async fn upload_public_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> SupabaseResult<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let response = self
            .authorized(self.http.post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(self.public_url(bucket, path))
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_strips_trailing_slash() {
        let client = SupabaseClient::new(Client::new(), "https://abc.supabase.co/", "key");
        assert_eq!(
            client.public_url("avatars", "a-1.png"),
            "https://abc.supabase.co/storage/v1/object/public/avatars/a-1.png"
        );
    }

    #[test]
    fn test_identity_ignores_extra_fields() {
        let identity: AuthIdentity = serde_json::from_value(json!({
            "id": "8f14e45f-ceea-467a-9575-6d1e3fb5e1a3",
            "aud": "authenticated",
            "email": "coach@example.com",
            "user_metadata": {}
        }))
        .unwrap();
        assert_eq!(identity.email.as_deref(), Some("coach@example.com"));
    }
}
