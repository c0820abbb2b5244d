//! Streaming counterpart of [`crate::deepgram`] used by the `/listen`
//! endpoint (§4.9). One [`DeepgramLiveSession`] per live session, opened
//! against a Deepgram-shaped streaming websocket.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use ingestgate_core::error::{Error, Result};
use ingestgate_core::ports::{LiveSegment, LiveTranscriptionProvider, LiveTranscriptionSession};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, Clone)]
pub struct DeepgramLiveConfig {
    pub api_key: String,
    pub ws_url: String,
}

impl DeepgramLiveConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("TRANSCRIPTION_API_KEY").unwrap_or_default(),
            ws_url: std::env::var("TRANSCRIPTION_LIVE_WS_URL").unwrap_or_else(|_| {
                "wss://api.deepgram.com/v1/listen?smart_format=true&diarize=true".to_string()
            }),
        }
    }
}

pub struct DeepgramLiveTranscriptionProvider {
    config: DeepgramLiveConfig,
}

impl DeepgramLiveTranscriptionProvider {
    pub fn new(config: DeepgramLiveConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LiveTranscriptionProvider for DeepgramLiveTranscriptionProvider {
    async fn open_session(&self) -> Result<Box<dyn LiveTranscriptionSession>> {
        let request = http::Request::builder()
            .uri(&self.config.ws_url)
            .header("Authorization", format!("Token {}", self.config.api_key))
            .header("Host", host_of(&self.config.ws_url))
            .header("Upgrade", "websocket")
            .header("Connection", "Upgrade")
            .header("Sec-WebSocket-Version", "13")
            .header("Sec-WebSocket-Key", tokio_tungstenite::tungstenite::handshake::client::generate_key())
            .body(())
            .map_err(|e| Error::Internal(format!("invalid live-transcription request: {e}")))?;

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| Error::TranscriptionFailed(format!("live connect failed: {e}")))?;

        Ok(Box::new(DeepgramLiveSession { stream: Mutex::new(stream) }))
    }
}

fn host_of(url: &str) -> String {
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split(['/', '?']).next())
        .unwrap_or_default()
        .to_string()
}

pub struct DeepgramLiveSession {
    stream: Mutex<WsStream>,
}

#[derive(Debug, Deserialize)]
struct LiveMessage {
    #[serde(default)]
    is_final: bool,
    #[serde(default)]
    channel: Option<LiveChannel>,
}

#[derive(Debug, Deserialize)]
struct LiveChannel {
    alternatives: Vec<LiveAlternative>,
}

#[derive(Debug, Deserialize)]
struct LiveAlternative {
    transcript: String,
    #[serde(default)]
    words: Vec<LiveWord>,
}

#[derive(Debug, Deserialize)]
struct LiveWord {
    #[serde(default)]
    speaker: Option<u32>,
}

#[async_trait]
impl LiveTranscriptionSession for DeepgramLiveSession {
    async fn send_audio(&self, frame: &[u8]) -> Result<()> {
        let mut stream = self.stream.lock().await;
        stream
            .send(Message::Binary(frame.to_vec().into()))
            .await
            .map_err(|e| Error::TranscriptionFailed(format!("live send failed: {e}")))
    }

    async fn next_segment(&self) -> Result<Option<LiveSegment>> {
        let mut stream = self.stream.lock().await;
        loop {
            let Some(msg) = stream.next().await else {
                return Ok(None);
            };
            let msg = msg.map_err(|e| Error::TranscriptionFailed(format!("live recv failed: {e}")))?;
            let text = match msg {
                Message::Text(t) => t,
                Message::Close(_) => return Ok(None),
                _ => continue,
            };

            let Ok(parsed) = serde_json::from_str::<LiveMessage>(&text) else {
                continue;
            };

            let Some(channel) = parsed.channel else { continue };
            let Some(alt) = channel.alternatives.into_iter().next() else { continue };
            if alt.transcript.trim().is_empty() {
                continue;
            }

            let speaker_index = alt.words.first().and_then(|w| w.speaker);
            return Ok(Some(LiveSegment {
                speaker_index,
                text: alt.transcript,
                is_final: parsed.is_final,
            }));
        }
    }

    async fn close(&self) -> Result<()> {
        let mut stream = self.stream.lock().await;
        stream
            .close(None)
            .await
            .map_err(|e| Error::TranscriptionFailed(format!("live close failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_of_extracts_host_without_scheme_or_path() {
        assert_eq!(host_of("wss://api.deepgram.com/v1/listen?x=1"), "api.deepgram.com");
    }

    #[test]
    fn live_message_without_channel_is_ignored() {
        let parsed: LiveMessage = serde_json::from_str(r#"{"is_final": true}"#).unwrap();
        assert!(parsed.channel.is_none());
    }
}
