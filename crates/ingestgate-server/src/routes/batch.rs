//! `POST /batch/process` (§4.8 synchronous audio endpoint, multipart).

use axum::extract::{Multipart, State};
use axum::Json;
use ingestgate_core::envelope::{ContentFormat, EnvelopeSource, InteractionType};
use ingestgate_core::error::Error;
use ingestgate_identity::RequestContextExtractor;
use ingestgate_orchestrator::OrchestratorRequest;
use ingestgate_transcription::mime::{extension_of, mime_for_extension};
use serde::Serialize;
use serde_json::Map;

use crate::error::ApiError;
use crate::state::AppState;

/// §4.8: "size ≤ ~100 MB".
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct BatchProcessResponse {
    pub raw_transcript: String,
    pub cleaned_transcript: String,
    pub interaction_id: uuid::Uuid,
}

pub async fn batch_process(
    State(state): State<AppState>,
    RequestContextExtractor(ctx): RequestContextExtractor,
    mut multipart: Multipart,
) -> Result<Json<BatchProcessResponse>, ApiError> {
    let mut file_bytes: Option<bytes::Bytes> = None;
    let mut mime_type: Option<&'static str> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(Error::Internal(format!("invalid multipart body: {e}"))))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError(Error::ValidationUnsupportedFormat("missing filename".to_string())))?;

        let extension = extension_of(&filename).map_err(ApiError)?;
        let mime = mime_for_extension(extension).map_err(ApiError)?;
        mime_type = Some(mime);

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError(Error::Internal(format!("failed to read upload: {e}"))))?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError(Error::ValidationTooLarge));
        }

        file_bytes = Some(bytes);
        break;
    }

    let file_bytes = file_bytes
        .ok_or_else(|| ApiError(Error::ValidationMissingField("file".to_string())))?;
    let mime_type = mime_type.ok_or_else(|| ApiError(Error::ValidationUnsupportedFormat("unknown".to_string())))?;

    let raw = state
        .transcription
        .transcribe_bytes(&file_bytes, mime_type)
        .await
        .map_err(ApiError)?;

    let cleaned_transcript = state.cleaner.clean(&raw.text).await;

    let mut extras = Map::new();
    if let Some(user_name) = &ctx.user_name {
        extras.insert("user_name".to_string(), serde_json::Value::from(user_name.clone()));
    }

    state
        .dispatch_pipeline(OrchestratorRequest {
            tenant_id: ctx.tenant_id,
            user_id: ctx.user_id.clone(),
            interaction_id: ctx.interaction_id,
            trace_id: ctx.trace_id.to_string(),
            account_id: ctx.account_id.clone(),
            interaction_type: InteractionType::BatchUpload,
            source: EnvelopeSource::Upload,
            content_format: ContentFormat::Diarized,
            cleaned_text: cleaned_transcript.clone(),
            extras,
        })
        .await;

    Ok(Json(BatchProcessResponse {
        raw_transcript: raw.text,
        cleaned_transcript,
        interaction_id: ctx.interaction_id,
    }))
}
