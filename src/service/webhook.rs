//! Tracker webhook receiver.
//!
//! Verifies an HMAC-SHA256 signature over the raw request body against a
//! shared secret. When no secret is configured, or the request carries no
//! signature header, the request is accepted — a deliberately permissive
//! default for demo deployments, logged loudly, not a security
//! recommendation. A present-but-wrong signature is rejected outright with
//! no partial processing.

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use tracing::{debug, instrument, warn};

use crate::service::{ApiError, AppState};

type HmacSha256 = Hmac<Sha256>;

/// Signature header carrying the hex-encoded HMAC digest.
const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Constant-time check of a hex signature against the body digest.
pub fn verify_signature(secret: &str, signature_hex: &str, body: &[u8]) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };

    // HMAC accepts keys of any length; treat a refusal as a mismatch
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Webhook endpoint: verify, then acknowledge the event and issue key.
#[instrument(skip(state, headers, body))]
pub async fn tracker_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match (&state.webhook_secret, signature) {
        (Some(secret), Some(sig)) => {
            if !verify_signature(secret, sig, &body) {
                return Err(ApiError::Unauthorized("bad signature".to_string()));
            }
            debug!("webhook signature verified");
        }
        // Open fallback: nothing to verify against
        _ => warn!("webhook accepted without signature verification"),
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid payload: {e}")))?;

    let event = payload
        .get("webhookEvent")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let key = payload
        .get("issue")
        .and_then(|issue| issue.get("key"))
        .and_then(Value::as_str);

    Ok(Json(json!({ "ok": true, "event": event, "key": key })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"webhookEvent":"jira:issue_updated"}"#;
        let sig = sign("s3cret", body);
        assert!(verify_signature("s3cret", &sig, body));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload";
        let sig = sign("s3cret", body);
        assert!(!verify_signature("other", &sig, body));
    }

    #[test]
    fn tampered_body_fails() {
        let sig = sign("s3cret", b"original");
        assert!(!verify_signature("s3cret", &sig, b"tampered"));
    }

    #[test]
    fn non_hex_signature_fails_closed() {
        assert!(!verify_signature("s3cret", "not-hex!", b"body"));
    }
}
