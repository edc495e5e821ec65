//! Payment provider client and webhook signature verification

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Reasons a webhook signature header is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header has no timestamp")]
    MissingTimestamp,
    #[error("signature header has no v1 signature")]
    MissingSignature,
    #[error("signature timestamp is outside the tolerance window")]
    Expired,
    #[error("no signature matches the payload")]
    Mismatch,
}

/// A created checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: String,
    price_id: String,
}

impl StripeClient {
    pub fn new(http: Client, api_base: &str, secret_key: &str, price_id: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
            price_id: price_id.to_string(),
        }
    }

    /// Start a subscription checkout for one seat of the configured price
    pub async fn create_checkout_session(
        &self,
        email: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let form = [
            ("customer_email", email),
            ("line_items[0][price]", self.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("mode", "subscription"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .http
            .post(url)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("checkout session creation failed")
                .to_string();
            warn!("Stripe returned {}: {}", status, message);
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session = response.json::<CheckoutSession>().await?;
        debug!("Created checkout session {} for {}", session.id, email);
        Ok(session)
    }
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`)
/// against the raw request body.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_700_000_000;

    fn sign(payload: &[u8], secret: &str, t: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.", t).as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = format!("t={},v1={}", NOW, sign(payload, SECRET, NOW));
        assert_eq!(verify_signature(payload, &header, SECRET, 300, NOW + 10), Ok(()));
    }

    #[test]
    fn test_any_matching_v1_is_enough() {
        let payload = b"{}";
        let header = format!(
            "t={},v1={},v1={}",
            NOW,
            sign(payload, "whsec_old", NOW),
            sign(payload, SECRET, NOW)
        );
        assert_eq!(verify_signature(payload, &header, SECRET, 300, NOW), Ok(()));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = format!("t={},v1={}", NOW, sign(b"{\"a\":1}", SECRET, NOW));
        assert_eq!(
            verify_signature(b"{\"a\":2}", &header, SECRET, 300, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = format!("t={},v1={}", NOW, sign(b"{}", "whsec_other", NOW));
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, 300, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_old_timestamp_rejected() {
        let t = NOW - 301;
        let header = format!("t={},v1={}", t, sign(b"{}", SECRET, t));
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, 300, NOW),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_malformed_headers_rejected() {
        assert_eq!(
            verify_signature(b"{}", "v1=abcd", SECRET, 300, NOW),
            Err(SignatureError::MissingTimestamp)
        );
        assert_eq!(
            verify_signature(b"{}", &format!("t={}", NOW), SECRET, 300, NOW),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            verify_signature(b"{}", &format!("t={},v1=not-hex", NOW), SECRET, 300, NOW),
            Err(SignatureError::Mismatch)
        );
    }
}
