//! §4.4 Transcription Adapter: REST client against a Deepgram-shaped
//! prerecorded-audio endpoint with smart-formatting and diarization on,
//! bound by a ~120s timeout.

use std::time::Duration;

use async_trait::async_trait;
use ingestgate_core::error::{Error, Result};
use ingestgate_core::ports::{RawTranscript, TranscriptionMetadata, TranscriptionProvider};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::format::{format_diarized, Word};

const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct DeepgramConfig {
    pub api_key: String,
    pub base_url: String,
}

impl DeepgramConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("TRANSCRIPTION_API_KEY").unwrap_or_default(),
            base_url: std::env::var("TRANSCRIPTION_BASE_URL")
                .unwrap_or_else(|_| "https://api.deepgram.com/v1/listen".to_string()),
        }
    }
}

pub struct DeepgramTranscriptionProvider {
    http: Client,
    config: DeepgramConfig,
}

impl DeepgramTranscriptionProvider {
    pub fn new(http: Client, config: DeepgramConfig) -> Self {
        Self { http, config }
    }

    fn listen_url(&self, mime_type: &str) -> String {
        format!(
            "{}?smart_format=true&diarize=true&encoding={}",
            self.config.base_url,
            urlencode_mime(mime_type)
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<RawTranscript> {
        let response = tokio::time::timeout(TRANSCRIBE_TIMEOUT, request.send())
            .await
            .map_err(|_| Error::TranscriptionTimeout)?
            .map_err(|e| Error::TranscriptionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TranscriptionFailed(format!("provider returned {status}: {body}")));
        }

        let parsed: DeepgramResponse = response
            .json()
            .await
            .map_err(|e| Error::TranscriptionFailed(format!("invalid provider response: {e}")))?;

        parsed.into_raw_transcript()
    }
}

#[async_trait]
impl TranscriptionProvider for DeepgramTranscriptionProvider {
    async fn transcribe_bytes(&self, audio_bytes: &[u8], mime_type: &str) -> Result<RawTranscript> {
        let request = self
            .http
            .post(self.listen_url(mime_type))
            .header("Authorization", format!("Token {}", self.config.api_key))
            .header("Content-Type", mime_type)
            .body(audio_bytes.to_vec());
        self.send(request).await
    }

    async fn transcribe_from_url(&self, audio_url: &str, mime_type: &str) -> Result<RawTranscript> {
        let request = self
            .http
            .post(self.listen_url(mime_type))
            .header("Authorization", format!("Token {}", self.config.api_key))
            .json(&serde_json::json!({ "url": audio_url }));
        self.send(request).await
    }
}

fn urlencode_mime(mime_type: &str) -> String {
    mime_type.replace('/', "%2F")
}

#[derive(Debug, Deserialize)]
struct DeepgramResponse {
    metadata: Option<DeepgramMetadata>,
    results: Option<DeepgramResults>,
}

#[derive(Debug, Deserialize)]
struct DeepgramMetadata {
    duration: Option<f64>,
    model_info: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(Debug, Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(Debug, Deserialize)]
struct DeepgramAlternative {
    #[serde(default)]
    words: Vec<DeepgramWord>,
}

#[derive(Debug, Deserialize)]
struct DeepgramWord {
    word: String,
    #[serde(default)]
    speaker: Option<u32>,
}

impl DeepgramResponse {
    fn into_raw_transcript(self) -> Result<RawTranscript> {
        let words: Vec<Word> = self
            .results
            .and_then(|r| r.channels.into_iter().next())
            .and_then(|c| c.alternatives.into_iter().next())
            .map(|a| {
                a.words
                    .into_iter()
                    .map(|w| Word {
                        text: w.word,
                        speaker: w.speaker,
                    })
                    .collect()
            })
            .unwrap_or_default();

        if words.is_empty() {
            warn!("transcription provider returned no words");
        }

        let text = format_diarized(&words);
        let metadata = TranscriptionMetadata {
            duration_seconds: self.metadata.as_ref().and_then(|m| m.duration),
            provider: Some("deepgram".to_string()),
            model: self
                .metadata
                .as_ref()
                .and_then(|m| m.model_info.as_ref())
                .and_then(|v| v.as_object())
                .and_then(|o| o.keys().next())
                .cloned(),
        };

        Ok(RawTranscript { text, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_words_into_diarized_text() {
        let raw = serde_json::json!({
            "metadata": {"duration": 12.5},
            "results": {
                "channels": [{
                    "alternatives": [{
                        "words": [
                            {"word": "hello", "speaker": 0},
                            {"word": "world", "speaker": 0},
                            {"word": "hi", "speaker": 1}
                        ]
                    }]
                }]
            }
        });
        let parsed: DeepgramResponse = serde_json::from_value(raw).unwrap();
        let transcript = parsed.into_raw_transcript().unwrap();
        assert_eq!(transcript.text, "SPEAKER_0: hello world\nSPEAKER_1: hi");
        assert_eq!(transcript.metadata.duration_seconds, Some(12.5));
    }

    #[test]
    fn missing_results_yields_empty_transcript_not_error() {
        let parsed: DeepgramResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        let transcript = parsed.into_raw_transcript().unwrap();
        assert_eq!(transcript.text, "");
    }
}
