//! `RequestContextExtractor` — handlers pull a resolved `RequestContext` out
//! of the request instead of re-parsing headers themselves, mirroring the
//! `RequestMetadataExt` pattern used at the ingress edge.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ingestgate_core::context::RequestContext;
use ingestgate_core::error::Error;

use crate::config::IdentityConfig;
use crate::resolver::resolve_context;

#[derive(Debug, Clone)]
pub struct RequestContextExtractor(pub RequestContext);

/// Thin HTTP-status wrapper around the small set of error kinds §4.1 can
/// actually produce. The full `Error` → status mapping for every other
/// route lives in `ingestgate-server`; this one is scoped to identity
/// resolution so this crate doesn't need to depend on the server's error
/// type.
#[derive(Debug)]
pub struct IdentityRejection(pub Error);

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::AuthMissing | Error::AuthInvalid(_) | Error::AuthExpired => {
                StatusCode::UNAUTHORIZED
            }
            Error::ValidationInvalidUuid { .. } | Error::ValidationMissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { detail: self.0.to_string() })).into_response()
    }
}

impl<S> FromRequestParts<S> for RequestContextExtractor
where
    S: Send + Sync,
    Arc<IdentityConfig>: FromRef<S>,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<IdentityConfig>::from_ref(state);
        let ctx = resolve_context(&parts.headers, &config).map_err(IdentityRejection)?;
        Ok(RequestContextExtractor(ctx))
    }
}
