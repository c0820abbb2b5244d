//! §6.6 configuration options consumed by the identity resolver.

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub allow_legacy_header_auth: bool,
    pub mock_tenant_id: Option<String>,
    pub mock_user_id: Option<String>,
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("INTERNAL_JWT_SECRET").unwrap_or_default(),
            jwt_issuer: std::env::var("INTERNAL_JWT_ISSUER").unwrap_or_default(),
            jwt_audience: std::env::var("INTERNAL_JWT_AUDIENCE").unwrap_or_default(),
            allow_legacy_header_auth: std::env::var("ALLOW_LEGACY_HEADER_AUTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            mock_tenant_id: std::env::var("MOCK_TENANT_ID").ok(),
            mock_user_id: std::env::var("MOCK_USER_ID").ok(),
        }
    }
}
