//! Error taxonomy shared by every crate in the workspace.
//!
//! Variants map 1:1 onto the error kinds named in the ingestion contract
//! (`VALIDATION_*`, `AUTH_*`, `NOT_FOUND`, `CONFLICT`, ...). HTTP status
//! mapping lives in `ingestgate-server`, not here, so this crate stays
//! transport-agnostic.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication credentials missing")]
    AuthMissing,

    #[error("authentication credentials invalid: {0}")]
    AuthInvalid(String),

    #[error("authentication token expired")]
    AuthExpired,

    #[error("invalid uuid in field {field}")]
    ValidationInvalidUuid { field: String },

    #[error("missing required field {0}")]
    ValidationMissingField(String),

    #[error("text must not be empty or whitespace-only")]
    ValidationEmptyText,

    #[error("unsupported audio format: {0}")]
    ValidationUnsupportedFormat(String),

    #[error("upload exceeds the maximum allowed size")]
    ValidationTooLarge,

    #[error("resource not found")]
    NotFound,

    #[error("resource is not in a state that allows this operation")]
    Conflict,

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("transcription timed out")]
    TranscriptionTimeout,

    #[error("cleaning failed: {0}")]
    CleanerFailed(String),

    #[error("object storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("unknown persona code: {0}")]
    PersonaUnknown(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine-readable code, used in `UploadJob.error_code` and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Error::AuthMissing => "AUTH_MISSING",
            Error::AuthInvalid(_) => "AUTH_INVALID",
            Error::AuthExpired => "AUTH_EXPIRED",
            Error::ValidationInvalidUuid { .. } => "VALIDATION_INVALID_UUID",
            Error::ValidationMissingField(_) => "VALIDATION_MISSING_FIELD",
            Error::ValidationEmptyText => "VALIDATION_EMPTY_TEXT",
            Error::ValidationUnsupportedFormat(_) => "VALIDATION_UNSUPPORTED_FORMAT",
            Error::ValidationTooLarge => "VALIDATION_TOO_LARGE",
            Error::NotFound => "NOT_FOUND",
            Error::Conflict => "CONFLICT",
            Error::TranscriptionFailed(_) => "TRANSCRIPTION_FAILED",
            Error::TranscriptionTimeout => "TRANSCRIPTION_FAILED",
            Error::CleanerFailed(_) => "CLEANER_FAILED",
            Error::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Error::PersonaUnknown(_) => "PERSONA_UNKNOWN",
            Error::PublishFailed(_) => "PUBLISH_FAILED",
            Error::Database(_) => "INTERNAL",
            Error::Serialization(_) => "INTERNAL",
            Error::Internal(_) => "INTERNAL",
        }
    }
}
