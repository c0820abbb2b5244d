//! `GET /listen` (§4.9 live session endpoint). One WebSocket connection per
//! live recording; identity is negotiated via a `token` query parameter so
//! the `Authorization` header — unavailable to browser WebSocket clients —
//! doesn't have to be.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use ingestgate_core::context::RequestContext;
use ingestgate_core::envelope::{ContentFormat, EnvelopeSource, InteractionType};
use ingestgate_core::ports::LiveSegment;
use ingestgate_identity::resolve_context;
use ingestgate_orchestrator::OrchestratorRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListenQuery {
    token: Option<String>,
}

/// §4.9 step 2: accept an explicit control message as a fallback when no
/// `token` query parameter was supplied.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ControlMessage {
    Identify { token: String },
    StopRecording,
}

#[derive(Debug, Serialize)]
struct SessionComplete {
    #[serde(rename = "type")]
    kind: &'static str,
    summary: String,
    action_items: Vec<String>,
    cleaned_transcript: String,
    raw_transcript: String,
}

pub async fn listen(
    State(state): State<AppState>,
    Query(query): Query<ListenQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = resolve_listen_context(&headers, &query, &state)?;
    Ok(ws.on_upgrade(move |socket| run_session(socket, state, ctx)))
}

/// §4.9 step 2: a `token` query param is tried first (the only option a
/// browser `WebSocket` constructor can express); falling back to headers
/// lets non-browser clients negotiate identity the same way the HTTP routes
/// do. Control-message identification happens later, inside the session,
/// once a socket already exists.
fn resolve_listen_context(
    headers: &HeaderMap,
    query: &ListenQuery,
    state: &AppState,
) -> Result<RequestContext, ApiError> {
    if let Some(token) = &query.token {
        let mut synthetic = headers.clone();
        if let Ok(value) = axum::http::HeaderValue::from_str(&format!("Bearer {token}")) {
            synthetic.insert(axum::http::header::AUTHORIZATION, value);
        }
        return resolve_context(&synthetic, &state.identity_config).map_err(ApiError);
    }

    resolve_context(headers, &state.identity_config).map_err(ApiError)
}

/// The session id is distinct from `ctx.interaction_id`: §4.9 step 1 mints
/// it fresh per connection, independent of whatever interaction the buffer
/// eventually gets folded into.
async fn run_session(mut socket: WebSocket, state: AppState, ctx: RequestContext) {
    let session_id = Uuid::new_v4();
    let buffer_key = format!("session:{session_id}:transcript");

    let live_session = match state.live_transcription.open_session().await {
        Ok(session) => session,
        Err(err) => {
            error!(error = %err, %session_id, "failed to open downstream live transcription session");
            let _ = socket.close().await;
            return;
        }
    };

    let mut stopped = false;
    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Binary(frame))) => {
                        if let Err(err) = live_session.send_audio(&frame).await {
                            warn!(error = %err, %session_id, "failed to forward audio frame downstream");
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        if handle_control_message(&text, &mut stopped) {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, %session_id, "websocket read error, finalizing session");
                        break;
                    }
                }
            }
            segment = live_session.next_segment() => {
                match segment {
                    Ok(Some(segment)) => handle_segment(&state, &buffer_key, segment, &mut socket, session_id).await,
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, %session_id, "downstream live transcription error, finalizing session");
                        break;
                    }
                }
            }
        }
    }

    finalize(&mut socket, &state, &ctx, &live_session, &buffer_key, session_id).await;
}

fn handle_control_message(text: &str, stopped: &mut bool) -> bool {
    match serde_json::from_str::<ControlMessage>(text) {
        Ok(ControlMessage::StopRecording) => {
            *stopped = true;
            true
        }
        Ok(ControlMessage::Identify { .. }) => false,
        Err(_) => false,
    }
}

/// §4.9 step 3: buffer append and telemetry emission are independent —
/// neither failure should stop the other, and neither should stop the
/// session.
async fn handle_segment(
    state: &AppState,
    buffer_key: &str,
    segment: LiveSegment,
    socket: &mut WebSocket,
    session_id: Uuid,
) {
    if !segment.is_final {
        return;
    }

    if let Err(err) = state.session_buffer.append(buffer_key, &segment.text).await {
        warn!(error = %err, %session_id, "session buffer append failed");
    }

    let telemetry = serde_json::json!({
        "type": "transcript_segment",
        "speaker_index": segment.speaker_index,
        "text": segment.text,
    });
    if let Ok(text) = serde_json::to_string(&telemetry) {
        if socket.send(Message::Text(text.into())).await.is_err() {
            warn!(%session_id, "failed to emit live transcript telemetry frame");
        }
    }
}

/// §4.9 "On close": runs regardless of exit path (disconnect, explicit
/// stop, or error) and never lets a downstream failure skip cleanup.
async fn finalize(
    socket: &mut WebSocket,
    state: &AppState,
    ctx: &RequestContext,
    live_session: &dyn ingestgate_core::ports::LiveTranscriptionSession,
    buffer_key: &str,
    session_id: Uuid,
) {
    if let Err(err) = live_session.close().await {
        warn!(error = %err, %session_id, "error closing downstream live transcription session");
    }

    let chunks = match state.session_buffer.range(buffer_key).await {
        Ok(chunks) => chunks,
        Err(err) => {
            warn!(error = %err, %session_id, "session buffer range failed during finalization");
            Vec::new()
        }
    };

    if let Err(err) = state.session_buffer.delete(buffer_key).await {
        warn!(error = %err, %session_id, "session buffer delete failed during finalization");
    }

    let raw_transcript = chunks.join(" ");
    if raw_transcript.trim().is_empty() {
        let _ = socket.close().await;
        return;
    }

    let cleaned_transcript = state.cleaner.clean(&raw_transcript).await;

    let mut extras = Map::new();
    if let Some(user_name) = &ctx.user_name {
        extras.insert("user_name".to_string(), Value::from(user_name.clone()));
    }

    let live_summary = state.cleaner.summarize_for_live(&cleaned_transcript).await;

    let _outcome = state
        .orchestrator
        .run(OrchestratorRequest {
            tenant_id: ctx.tenant_id,
            user_id: ctx.user_id.clone(),
            interaction_id: ctx.interaction_id,
            trace_id: ctx.trace_id.to_string(),
            account_id: ctx.account_id.clone(),
            interaction_type: InteractionType::Meeting,
            source: EnvelopeSource::Websocket,
            content_format: ContentFormat::Diarized,
            cleaned_text: cleaned_transcript.clone(),
            extras,
        })
        .await;

    let (summary, action_items) = match live_summary {
        Some(live_summary) => (live_summary.summary, live_summary.action_items),
        None => (String::new(), Vec::new()),
    };

    let complete = SessionComplete {
        kind: "session_complete",
        summary,
        action_items,
        cleaned_transcript,
        raw_transcript,
    };

    if let Ok(text) = serde_json::to_string(&complete) {
        let _ = socket.send(Message::Text(text.into())).await;
    }
    let _ = socket.close().await;
}
