//! `EnvelopeV1` — the single versioned schema used for every downstream
//! hand-off (stream, event bus). Constructed exactly once per completed
//! pipeline run and serialized exactly once per publish attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Transcript,
    Note,
    Meeting,
    BatchUpload,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvelopeSource {
    WebMic,
    Upload,
    Api,
    Websocket,
    Import,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Plain,
    Markdown,
    Diarized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeContent {
    pub text: String,
    pub format: ContentFormat,
}

/// `schema_version` is fixed at `"v1"`; it is still a real field (rather
/// than implied by the type) so a future `EnvelopeV2` can be distinguished
/// on the wire without a breaking change to this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeV1 {
    pub schema_version: String,
    pub tenant_id: Uuid,
    pub user_id: String,
    pub interaction_type: InteractionType,
    pub content: EnvelopeContent,
    pub timestamp: DateTime<Utc>,
    pub source: EnvelopeSource,
    /// Open map: unknown keys added by future callers must round-trip
    /// without a schema change (§8 invariant 2).
    pub extras: Map<String, Value>,
    pub interaction_id: Uuid,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

#[derive(Default)]
pub struct EnvelopeBuilder {
    extras: Map<String, Value>,
    account_id: Option<String>,
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras = extras;
        self
    }

    pub fn account_id(mut self, account_id: Option<String>) -> Self {
        self.account_id = account_id;
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn build(
        self,
        tenant_id: Uuid,
        user_id: impl Into<String>,
        interaction_type: InteractionType,
        text: impl Into<String>,
        format: ContentFormat,
        source: EnvelopeSource,
        interaction_id: Uuid,
        trace_id: impl Into<String>,
    ) -> EnvelopeV1 {
        EnvelopeV1 {
            schema_version: SCHEMA_VERSION.to_string(),
            tenant_id,
            user_id: user_id.into(),
            interaction_type,
            content: EnvelopeContent {
                text: text.into(),
                format,
            },
            timestamp: Utc::now(),
            source,
            extras: self.extras,
            interaction_id,
            trace_id: trace_id.into(),
            account_id: self.account_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EnvelopeV1 {
        EnvelopeBuilder::new()
            .extra("user_name", "Ada Lovelace")
            .extra("unknown_future_key", serde_json::json!({"nested": true}))
            .account_id(Some("acct-1".to_string()))
            .build(
                Uuid::new_v4(),
                "auth0|abc123",
                InteractionType::Note,
                "hello world",
                ContentFormat::Plain,
                EnvelopeSource::Api,
                Uuid::new_v4(),
                Uuid::new_v4().to_string(),
            )
    }

    #[test]
    fn round_trips_field_by_field() {
        let envelope = sample();
        let json = serde_json::to_string(&envelope).unwrap();
        let restored: EnvelopeV1 = serde_json::from_str(&json).unwrap();
        assert_eq!(envelope, restored);
    }

    #[test]
    fn timestamp_serializes_with_z_suffix() {
        let envelope = sample();
        let json = serde_json::to_value(&envelope).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'), "timestamp {ts} missing Z suffix");
    }

    #[test]
    fn uuids_serialize_as_canonical_hyphenated_lowercase() {
        let envelope = sample();
        let json = serde_json::to_value(&envelope).unwrap();
        let tenant = json["tenant_id"].as_str().unwrap();
        assert_eq!(tenant, envelope.tenant_id.to_string());
        assert!(tenant.chars().all(|c| !c.is_ascii_uppercase()));
    }

    #[test]
    fn extras_survive_unknown_keys() {
        let raw = r#"{
            "schema_version": "v1",
            "tenant_id": "11111111-1111-1111-1111-111111111111",
            "user_id": "u1",
            "interaction_type": "note",
            "content": {"text": "hi", "format": "plain"},
            "timestamp": "2026-01-01T00:00:00Z",
            "source": "api",
            "extras": {"brand_new_key_nobody_knows_about": 42},
            "interaction_id": "22222222-2222-2222-2222-222222222222",
            "trace_id": "trace-1"
        }"#;
        let envelope: EnvelopeV1 = serde_json::from_str(raw).unwrap();
        assert_eq!(
            envelope.extras.get("brand_new_key_nobody_knows_about"),
            Some(&Value::from(42))
        );
    }
}
