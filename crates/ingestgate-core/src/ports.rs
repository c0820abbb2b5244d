//! Trait seams for every external collaborator this crate talks to but
//! doesn't own. Each satellite crate implements the trait it owns;
//! `ingestgate-server` wires concrete implementations in behind
//! `Arc<dyn Trait>` at bootstrap, so the backing store for each
//! collaborator lives entirely outside this crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::envelope::EnvelopeV1;
use crate::error::Result;

/// Ack returned by a successful stream or bus publish. Opaque to callers;
/// only used for logging / idempotency bookkeeping downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAck(pub String);

/// Ordered, partitioned stream (Kinesis-shaped).
#[async_trait]
pub trait StreamPublisher: Send + Sync {
    async fn put_record(&self, partition_key: &str, payload: &[u8]) -> Result<PublishAck>;
}

/// Routed event bus (EventBridge-shaped).
#[async_trait]
pub trait EventBusPublisher: Send + Sync {
    async fn put_event(&self, source: &str, detail_type: &str, detail_json: &str) -> Result<PublishAck>;
}

/// Result of the dual-write publish attempt. Never an `Err` to the
/// caller — see `ingestgate-publisher::publish`.
#[derive(Debug, Clone, Default)]
pub struct PublishOutcome {
    pub stream_ack: Option<PublishAck>,
    pub bus_ack: Option<PublishAck>,
}

/// Presigned object storage (S3-shaped).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Issue a time-limited PUT URL for `key` accepting `mime_type`.
    async fn presign_put(
        &self,
        key: &str,
        mime_type: &str,
        ttl: std::time::Duration,
    ) -> Result<(String, DateTime<Utc>)>;

    /// Issue a time-limited GET URL for `key`, used by the upload worker.
    async fn presign_get(&self, key: &str, ttl: std::time::Duration) -> Result<String>;
}

/// Speaker-labeled transcript plus provider metadata, returned by both
/// entry points of the transcription adapter.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionMetadata {
    pub duration_seconds: Option<f64>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawTranscript {
    pub text: String,
    pub metadata: TranscriptionMetadata,
}

/// Speech-to-text provider, used by both the synchronous batch endpoint
/// and the upload worker.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe_bytes(&self, audio_bytes: &[u8], mime_type: &str) -> Result<RawTranscript>;
    async fn transcribe_from_url(&self, audio_url: &str, mime_type: &str) -> Result<RawTranscript>;
}

/// One finalized segment from a live downstream transcription session.
#[derive(Debug, Clone)]
pub struct LiveSegment {
    pub speaker_index: Option<u32>,
    pub text: String,
    pub is_final: bool,
}

/// Streaming counterpart of [`TranscriptionProvider`], used by the `/listen`
/// endpoint. One instance per live session.
#[async_trait]
pub trait LiveTranscriptionSession: Send + Sync {
    async fn send_audio(&self, frame: &[u8]) -> Result<()>;
    /// Returns `None` once the downstream connection has closed.
    async fn next_segment(&self) -> Result<Option<LiveSegment>>;
    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait LiveTranscriptionProvider: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn LiveTranscriptionSession>>;
}

/// Ordered, TTL-bounded append log keyed by session id (§4.11).
#[async_trait]
pub trait SessionBufferStore: Send + Sync {
    async fn append(&self, key: &str, chunk: &str) -> Result<()>;
    async fn range(&self, key: &str) -> Result<Vec<String>>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// JSON-schema-constrained LLM call with retries on validation failure.
/// `schema_name` is passed through for provider request-shaping /
/// observability; the actual JSON Schema lives with the caller.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete_text(&self, system_prompt: &str, user_prompt: &str, timeout: std::time::Duration) -> Result<String>;

    async fn complete_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_name: &str,
        json_schema: &serde_json::Value,
        max_retries: u32,
        timeout: std::time::Duration,
    ) -> Result<serde_json::Value>;

    fn model(&self) -> &str;
    fn provider_name(&self) -> &str;
}

/// Implemented by `ingestgate-publisher`; re-exported here so
/// `ingestgate-orchestrator` can depend on the trait without depending on
/// the concrete AWS clients.
#[async_trait]
pub trait FanOutPublisher: Send + Sync {
    async fn publish(&self, envelope: &EnvelopeV1) -> PublishOutcome;
}

/// Minimal identity used by `complete`/`status` tenant-scoping checks
/// without pulling the whole `RequestContext` into the upload crate's
/// repository layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope(pub Uuid);
