//! §7 error taxonomy → HTTP status mapping. Every endpoint returns JSON
//! `{"detail": "<message>"}` on failure; no secrets, no stack traces.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ingestgate_core::error::Error;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::AuthMissing | Error::AuthInvalid(_) | Error::AuthExpired => StatusCode::UNAUTHORIZED,
            Error::ValidationInvalidUuid { .. }
            | Error::ValidationMissingField(_)
            | Error::ValidationEmptyText
            | Error::ValidationUnsupportedFormat(_)
            | Error::ValidationTooLarge => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Conflict => StatusCode::CONFLICT,
            Error::TranscriptionFailed(_) | Error::TranscriptionTimeout => StatusCode::INTERNAL_SERVER_ERROR,
            Error::CleanerFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PersonaUnknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PublishFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(_) | Error::Serialization(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorBody { detail: self.0.to_string() })).into_response()
    }
}
