//! Service settings loaded from the environment

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Settings for the API service. Each field maps to the upper-cased
/// environment variable of the same name (`BIND_ADDR`, `STRIPE_PRICE_ID`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    /// Origin of the web app, used for checkout redirect URLs
    pub public_base_url: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    /// HS256 secret the auth provider signs access tokens with
    pub supabase_jwt_secret: String,
    pub avatar_bucket: String,
    pub stripe_secret_key: String,
    pub stripe_price_id: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    /// Maximum age of a webhook signature timestamp
    pub webhook_tolerance_secs: i64,
}

impl Settings {
    /// Load settings, applying defaults for everything but provider secrets
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:3001")?
            .set_default("public_base_url", "http://localhost:3000")?
            .set_default("avatar_bucket", "avatars")?
            .set_default("stripe_api_base", "https://api.stripe.com")?
            .set_default("webhook_tolerance_secs", 300_i64)?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
