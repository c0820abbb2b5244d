//! HMAC-SHA256 signed-token verification (§4.1 mode 1).
//!
//! A full JWT crate would bring its own crypto-agility policy (which
//! algorithms to trust, how to resolve keys) that we'd immediately have to
//! override for a single shared HS256 secret, so this decodes the JWT
//! structure by hand: split on `.`, recompute the HMAC over
//! `header.payload`, and compare in constant time via `hmac`'s own
//! `verify_slice`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use ingestgate_core::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Allowed clock skew for `exp` checks.
const CLOCK_SKEW_SECS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct Claims {
    pub iss: Option<String>,
    pub aud: Option<String>,
    pub exp: Option<i64>,
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(default)]
    pub pg_user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
}

/// Verify `token`'s signature and decode its claims. Does not check
/// issuer/audience/expiry — callers validate those against configuration so
/// the error kinds stay specific (`AUTH_INVALID` vs `AUTH_EXPIRED`).
pub fn decode_and_verify(token: &str, secret: &str) -> Result<Claims> {
    let parts: Vec<&str> = token.split('.').collect();
    let [header_b64, payload_b64, signature_b64] = parts[..] else {
        return Err(Error::AuthInvalid("malformed token".to_string()));
    };

    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| Error::AuthInvalid("malformed token signature".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| Error::AuthInvalid("invalid signing key".to_string()))?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| Error::AuthInvalid("signature mismatch".to_string()))?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| Error::AuthInvalid("malformed token payload".to_string()))?;

    serde_json::from_slice(&payload_bytes)
        .map_err(|_| Error::AuthInvalid("malformed token claims".to_string()))
}

/// Validate issuer, audience and expiry against configuration.
pub fn validate_claims(claims: &Claims, issuer: &str, audience: &str, now_unix: i64) -> Result<()> {
    if claims.iss.as_deref() != Some(issuer) {
        return Err(Error::AuthInvalid("issuer mismatch".to_string()));
    }
    if claims.aud.as_deref() != Some(audience) {
        return Err(Error::AuthInvalid("audience mismatch".to_string()));
    }
    match claims.exp {
        Some(exp) if exp + CLOCK_SKEW_SECS < now_unix => Err(Error::AuthExpired),
        Some(_) => Ok(()),
        None => Err(Error::AuthInvalid("missing exp claim".to_string())),
    }
}

/// Log-safe prefix of a bearer token (§4.1: "never log the full token").
pub fn loggable_prefix(token: &str) -> String {
    token.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, header: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{header}.{payload}").as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    fn make_token(secret: &str, claims_json: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims_json);
        let sig = sign(secret, &header, &payload);
        format!("{header}.{payload}.{sig}")
    }

    #[test]
    fn verifies_and_decodes_a_well_signed_token() {
        let token = make_token(
            "s3cr3t",
            r#"{"iss":"ingestgate","aud":"ingestgate-clients","exp":9999999999,"tenant_id":"11111111-1111-1111-1111-111111111111","user_id":"auth0|abc"}"#,
        );
        let claims = decode_and_verify(&token, "s3cr3t").unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("auth0|abc"));
    }

    #[test]
    fn rejects_a_tampered_signature() {
        let mut token = make_token("s3cr3t", r#"{"iss":"a","aud":"b","exp":9999999999}"#);
        token.push('x');
        assert!(decode_and_verify(&token, "s3cr3t").is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = make_token("s3cr3t", r#"{"iss":"a","aud":"b","exp":9999999999}"#);
        assert!(decode_and_verify(&token, "other").is_err());
    }

    #[test]
    fn rejects_malformed_structure() {
        assert!(decode_and_verify("not-a-jwt", "s3cr3t").is_err());
    }

    #[test]
    fn validate_claims_rejects_expired_beyond_skew() {
        let claims = Claims {
            iss: Some("a".to_string()),
            aud: Some("b".to_string()),
            exp: Some(1000),
            tenant_id: None,
            user_id: None,
            pg_user_id: None,
            user_name: None,
            account_id: None,
            trace_id: None,
        };
        assert!(matches!(
            validate_claims(&claims, "a", "b", 1031 + CLOCK_SKEW_SECS),
            Err(Error::AuthExpired)
        ));
    }

    #[test]
    fn validate_claims_tolerates_skew() {
        let claims = Claims {
            iss: Some("a".to_string()),
            aud: Some("b".to_string()),
            exp: Some(1000),
            tenant_id: None,
            user_id: None,
            pg_user_id: None,
            user_name: None,
            account_id: None,
            trace_id: None,
        };
        assert!(validate_claims(&claims, "a", "b", 1020).is_ok());
    }

    #[test]
    fn loggable_prefix_truncates_to_eight_chars() {
        assert_eq!(loggable_prefix("abcdefghijklmnop"), "abcdefgh");
    }
}
