//! §4.10.1–§4.10.3: `/upload/init`, `/upload/complete`, `/upload/status/{job_id}`.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use ingestgate_core::upload::UploadJob;
use ingestgate_identity::RequestContextExtractor;
use ingestgate_upload::{CompleteRequest as ServiceCompleteRequest, InitRequest as ServiceInitRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InitRequestBody {
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct InitResponseBody {
    pub upload_url: String,
    pub file_key: String,
    pub job_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

pub async fn init(
    State(state): State<AppState>,
    RequestContextExtractor(ctx): RequestContextExtractor,
    Json(body): Json<InitRequestBody>,
) -> Result<Json<InitResponseBody>, ApiError> {
    let response = state
        .upload_jobs
        .init(
            &ctx,
            ServiceInitRequest {
                filename: body.filename,
                mime_type: body.mime_type,
                file_size: body.file_size,
            },
        )
        .await
        .map_err(ApiError)?;

    Ok(Json(InitResponseBody {
        upload_url: response.upload_url,
        file_key: response.file_key,
        job_id: response.job_id,
        expires_at: response.expires_at,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequestBody {
    pub file_key: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponseBody {
    pub job_id: Uuid,
    pub interaction_id: Uuid,
    pub status: &'static str,
}

pub async fn complete(
    State(state): State<AppState>,
    RequestContextExtractor(ctx): RequestContextExtractor,
    Json(body): Json<CompleteRequestBody>,
) -> Result<Json<CompleteResponseBody>, ApiError> {
    let response = state
        .upload_jobs
        .complete(
            &ctx,
            ServiceCompleteRequest {
                file_key: body.file_key,
                file_name: body.file_name,
                mime_type: body.mime_type,
                file_size: body.file_size,
            },
        )
        .await
        .map_err(ApiError)?;

    Ok(Json(CompleteResponseBody {
        job_id: response.job_id,
        interaction_id: response.interaction_id,
        status: response.status.as_str(),
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponseBody {
    pub job_id: Uuid,
    pub status: &'static str,
    pub job_type: &'static str,
    pub interaction_id: Uuid,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub result_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<UploadJob> for StatusResponseBody {
    fn from(job: UploadJob) -> Self {
        Self {
            job_id: job.id,
            status: job.status.as_str(),
            job_type: job.job_type.as_str(),
            interaction_id: job.interaction_id,
            error_code: job.error_code,
            error_message: job.error_message,
            result_summary: job.result_summary,
            created_at: job.created_at,
            updated_at: job.updated_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

pub async fn status(
    State(state): State<AppState>,
    RequestContextExtractor(ctx): RequestContextExtractor,
    Path(job_id): Path<Uuid>,
) -> Result<Json<StatusResponseBody>, ApiError> {
    let job = state.upload_jobs.status(&ctx, job_id).await.map_err(ApiError)?;
    Ok(Json(job.into()))
}
