//! `POST /text/clean` (§4.8 text endpoint).

use axum::extract::State;
use axum::Json;
use ingestgate_core::envelope::{ContentFormat, EnvelopeSource, InteractionType};
use ingestgate_core::error::Error;
use ingestgate_identity::RequestContextExtractor;
use ingestgate_orchestrator::OrchestratorRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TextCleanRequest {
    pub text: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TextCleanResponse {
    pub raw_text: String,
    pub cleaned_text: String,
    pub interaction_id: uuid::Uuid,
}

pub async fn text_clean(
    State(state): State<AppState>,
    RequestContextExtractor(ctx): RequestContextExtractor,
    Json(request): Json<TextCleanRequest>,
) -> Result<Json<TextCleanResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError(Error::ValidationEmptyText));
    }

    let cleaned_text = state.cleaner.clean(&request.text).await;

    let mut extras = request.metadata.unwrap_or_default();
    if let Some(user_name) = &ctx.user_name {
        extras.insert("user_name".to_string(), Value::from(user_name.clone()));
    }

    let source = parse_envelope_source(request.source.as_deref());

    state
        .dispatch_pipeline(OrchestratorRequest {
            tenant_id: ctx.tenant_id,
            user_id: ctx.user_id.clone(),
            interaction_id: ctx.interaction_id,
            trace_id: ctx.trace_id.to_string(),
            account_id: ctx.account_id.clone(),
            interaction_type: InteractionType::Note,
            source,
            content_format: ContentFormat::Plain,
            cleaned_text: cleaned_text.clone(),
            extras,
        })
        .await;

    Ok(Json(TextCleanResponse {
        raw_text: request.text,
        cleaned_text,
        interaction_id: ctx.interaction_id,
    }))
}

fn parse_envelope_source(source: Option<&str>) -> EnvelopeSource {
    match source {
        Some("web-mic") => EnvelopeSource::WebMic,
        Some("upload") => EnvelopeSource::Upload,
        Some("websocket") => EnvelopeSource::Websocket,
        Some("import") => EnvelopeSource::Import,
        _ => EnvelopeSource::Api,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_envelope_source_defaults_to_api() {
        assert_eq!(parse_envelope_source(None), EnvelopeSource::Api);
        assert_eq!(parse_envelope_source(Some("bogus")), EnvelopeSource::Api);
    }

    #[test]
    fn parse_envelope_source_recognizes_every_named_source() {
        assert_eq!(parse_envelope_source(Some("web-mic")), EnvelopeSource::WebMic);
        assert_eq!(parse_envelope_source(Some("upload")), EnvelopeSource::Upload);
        assert_eq!(parse_envelope_source(Some("websocket")), EnvelopeSource::Websocket);
        assert_eq!(parse_envelope_source(Some("import")), EnvelopeSource::Import);
    }
}
