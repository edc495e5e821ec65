//! Verification of the auth provider's access tokens
//!
//! Tokens are HS256-signed by the provider with the project's JWT secret and
//! carry the `authenticated` audience. This service never issues tokens.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Audience the provider stamps on signed-in user tokens
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Auth identity id
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and return the user it was issued to
    pub fn verify(&self, token: &str) -> Option<AuthUser> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(AuthUser {
                id: data.claims.sub,
                email: data.claims.email,
            }),
            Err(e) => {
                debug!("Rejected access token: {}", e);
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{SECRET, token_for};
    use super::*;

    #[test]
    fn test_valid_token() {
        let id = Uuid::new_v4();
        let verifier = TokenVerifier::new(SECRET);
        let user = verifier
            .verify(&token_for(id, AUTHENTICATED_AUDIENCE, 3600, SECRET))
            .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("coach@example.com"));
    }

    #[test]
    fn test_rejections() {
        let id = Uuid::new_v4();
        let verifier = TokenVerifier::new(SECRET);
        assert!(verifier.verify(&token_for(id, AUTHENTICATED_AUDIENCE, -3600, SECRET)).is_none());
        assert!(verifier.verify(&token_for(id, "anon", 3600, SECRET)).is_none());
        assert!(verifier.verify(&token_for(id, AUTHENTICATED_AUDIENCE, 3600, "other")).is_none());
        assert!(verifier.verify("not-a-token").is_none());
    }
}
