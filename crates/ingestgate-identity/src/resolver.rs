//! §4.1 Identity & Context Resolver: turns inbound request headers into a
//! `RequestContext`, trying signed-token auth first and falling back to
//! legacy headers only when explicitly enabled.

use axum::http::HeaderMap;
use chrono::Utc;
use ingestgate_core::context::RequestContext;
use ingestgate_core::error::{Error, Result};
use tracing::debug;
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::token::{decode_and_verify, loggable_prefix, validate_claims, Claims};

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_required_uuid(value: Option<&str>, field: &str) -> Result<Uuid> {
    value
        .ok_or_else(|| Error::ValidationMissingField(field.to_string()))
        .and_then(|s| {
            Uuid::parse_str(s).map_err(|_| Error::ValidationInvalidUuid {
                field: field.to_string(),
            })
        })
}

fn parse_optional_trace_id(value: Option<&str>) -> Option<Uuid> {
    value.and_then(|s| Uuid::parse_str(s).ok())
}

fn context_from_claims(claims: Claims) -> Result<RequestContext> {
    let tenant_id = parse_required_uuid(claims.tenant_id.as_deref(), "tenant_id")?;
    let user_id = claims
        .user_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::ValidationMissingField("user_id".to_string()))?;
    let trace_id = parse_optional_trace_id(claims.trace_id.as_deref());

    Ok(RequestContext::new(
        tenant_id,
        user_id,
        claims.pg_user_id,
        claims.user_name,
        claims.account_id,
        trace_id,
    ))
}

fn resolve_signed_token(headers: &HeaderMap, config: &IdentityConfig) -> Result<RequestContext> {
    let auth_header = header_str(headers, "authorization").ok_or(Error::AuthMissing)?;
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::AuthInvalid("missing Bearer scheme".to_string()))?;

    debug!(token_prefix = %loggable_prefix(token), "verifying signed identity token");

    let claims = decode_and_verify(token, &config.jwt_secret)?;
    validate_claims(
        &claims,
        &config.jwt_issuer,
        &config.jwt_audience,
        Utc::now().timestamp(),
    )?;

    context_from_claims(claims)
}

/// §6.6: `MOCK_TENANT_ID`/`MOCK_USER_ID` are dev-only fallbacks consulted
/// only when the corresponding legacy header is absent — they never
/// override a header that was actually sent.
fn resolve_legacy_headers(headers: &HeaderMap, config: &IdentityConfig) -> Result<RequestContext> {
    let tenant_id = match header_str(headers, "x-tenant-id") {
        Some(raw) => parse_required_uuid(Some(raw), "tenant_id")?,
        None => parse_required_uuid(config.mock_tenant_id.as_deref(), "tenant_id")?,
    };
    let user_id = header_str(headers, "x-user-id")
        .filter(|s| !s.is_empty())
        .or(config.mock_user_id.as_deref().filter(|s| !s.is_empty()))
        .ok_or_else(|| Error::ValidationMissingField("user_id".to_string()))?
        .to_string();
    let trace_id = parse_optional_trace_id(header_str(headers, "x-trace-id"));
    let account_id = header_str(headers, "x-account-id").map(str::to_string);

    Ok(RequestContext::new(
        tenant_id, user_id, None, None, account_id, trace_id,
    ))
}

/// §4.1 precedence: signed token, then legacy headers if enabled, else
/// `AUTH_MISSING`.
pub fn resolve_context(headers: &HeaderMap, config: &IdentityConfig) -> Result<RequestContext> {
    if header_str(headers, "authorization").is_some() {
        return resolve_signed_token(headers, config);
    }

    if config.allow_legacy_header_auth {
        return resolve_legacy_headers(headers, config);
    }

    Err(Error::AuthMissing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (k, v) in pairs {
            headers.insert(
                axum::http::HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn missing_auth_and_legacy_disabled_fails_auth_missing() {
        let config = IdentityConfig {
            jwt_secret: "s".into(),
            jwt_issuer: "i".into(),
            jwt_audience: "a".into(),
            allow_legacy_header_auth: false,
            mock_tenant_id: None,
            mock_user_id: None,
        };
        let result = resolve_context(&HeaderMap::new(), &config);
        assert!(matches!(result, Err(Error::AuthMissing)));
    }

    #[test]
    fn legacy_headers_build_a_context_when_enabled() {
        let config = IdentityConfig {
            jwt_secret: "s".into(),
            jwt_issuer: "i".into(),
            jwt_audience: "a".into(),
            allow_legacy_header_auth: true,
            mock_tenant_id: None,
            mock_user_id: None,
        };
        let tenant = Uuid::new_v4().to_string();
        let headers = headers_with(&[("x-tenant-id", &tenant), ("x-user-id", "user-1")]);
        let ctx = resolve_context(&headers, &config).unwrap();
        assert_eq!(ctx.tenant_id.to_string(), tenant);
        assert_eq!(ctx.user_id, "user-1");
    }

    #[test]
    fn legacy_headers_reject_invalid_tenant_uuid() {
        let config = IdentityConfig {
            jwt_secret: "s".into(),
            jwt_issuer: "i".into(),
            jwt_audience: "a".into(),
            allow_legacy_header_auth: true,
            mock_tenant_id: None,
            mock_user_id: None,
        };
        let headers = headers_with(&[("x-tenant-id", "not-a-uuid"), ("x-user-id", "user-1")]);
        assert!(matches!(
            resolve_context(&headers, &config),
            Err(Error::ValidationInvalidUuid { .. })
        ));
    }

    #[test]
    fn legacy_mode_is_not_tried_when_disabled_even_without_auth_header() {
        let config = IdentityConfig {
            jwt_secret: "s".into(),
            jwt_issuer: "i".into(),
            jwt_audience: "a".into(),
            allow_legacy_header_auth: false,
            mock_tenant_id: None,
            mock_user_id: None,
        };
        let headers = headers_with(&[("x-tenant-id", &Uuid::new_v4().to_string()), ("x-user-id", "u")]);
        assert!(matches!(resolve_context(&headers, &config), Err(Error::AuthMissing)));
    }

    #[test]
    fn legacy_headers_fall_back_to_mock_config_when_absent() {
        let tenant = Uuid::new_v4().to_string();
        let config = IdentityConfig {
            jwt_secret: "s".into(),
            jwt_issuer: "i".into(),
            jwt_audience: "a".into(),
            allow_legacy_header_auth: true,
            mock_tenant_id: Some(tenant.clone()),
            mock_user_id: Some("mock-user".into()),
        };
        let ctx = resolve_context(&HeaderMap::new(), &config).unwrap();
        assert_eq!(ctx.tenant_id.to_string(), tenant);
        assert_eq!(ctx.user_id, "mock-user");
    }

    #[test]
    fn legacy_headers_present_take_precedence_over_mock_config() {
        let header_tenant = Uuid::new_v4().to_string();
        let config = IdentityConfig {
            jwt_secret: "s".into(),
            jwt_issuer: "i".into(),
            jwt_audience: "a".into(),
            allow_legacy_header_auth: true,
            mock_tenant_id: Some(Uuid::new_v4().to_string()),
            mock_user_id: Some("mock-user".into()),
        };
        let headers = headers_with(&[("x-tenant-id", &header_tenant), ("x-user-id", "real-user")]);
        let ctx = resolve_context(&headers, &config).unwrap();
        assert_eq!(ctx.tenant_id.to_string(), header_tenant);
        assert_eq!(ctx.user_id, "real-user");
    }
}
