//! §4.5 Cleaner: chunk the raw transcript by speaker turn, clean each chunk
//! independently via the shared LLM client, and rejoin. A single chunk's
//! failure never aborts the whole clean (§7: "absorbed locally").

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use ingestgate_core::ports::LlmClient;
use ingestgate_observability::metrics::Metrics;
use serde::Deserialize;
use tracing::warn;

use crate::chunking::chunk_transcript;
use crate::prompt::{live_summary_user_prompt, user_prompt, LIVE_SUMMARY_SYSTEM_PROMPT, SYSTEM_PROMPT};

const PER_CHUNK_TIMEOUT: Duration = Duration::from_secs(60);
const LIVE_SUMMARY_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Cleaner {
    llm: Arc<dyn LlmClient>,
    metrics: Arc<Metrics>,
}

#[derive(Debug, Clone, Default)]
pub struct LiveSummary {
    pub summary: String,
    pub action_items: Vec<String>,
}

impl Cleaner {
    pub fn new(llm: Arc<dyn LlmClient>, metrics: Arc<Metrics>) -> Self {
        Self { llm, metrics }
    }

    /// `clean(raw_transcript) -> cleaned_transcript` (§4.5). Never fails:
    /// a chunk the LLM can't clean falls back to its original text.
    pub async fn clean(&self, raw_transcript: &str) -> String {
        if raw_transcript.trim().is_empty() {
            return String::new();
        }

        let chunks = chunk_transcript(raw_transcript);
        let mut cleaned_chunks = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let cleaned = self.clean_chunk(&chunk).await;
            cleaned_chunks.push(cleaned);
        }

        cleaned_chunks.join("\n")
    }

    async fn clean_chunk(&self, chunk: &str) -> String {
        let result = tokio::time::timeout(
            PER_CHUNK_TIMEOUT,
            self.llm.complete_text(SYSTEM_PROMPT, &user_prompt(chunk), PER_CHUNK_TIMEOUT),
        )
        .await;

        match result {
            Ok(Ok(cleaned)) => {
                warn_if_introduces_words(chunk, &cleaned);
                warn_if_prefix_dropped(chunk, &cleaned);
                cleaned
            }
            Ok(Err(e)) => {
                warn!(error = %e, "per-chunk clean failed, falling back to original chunk");
                self.metrics
                    .cleaner_fallbacks_total
                    .with_label_values(&["llm_error"])
                    .inc();
                chunk.to_string()
            }
            Err(_) => {
                warn!("per-chunk clean timed out, falling back to original chunk");
                self.metrics
                    .cleaner_fallbacks_total
                    .with_label_values(&["timeout"])
                    .inc();
                chunk.to_string()
            }
        }
    }

    /// Live-only: a short summary plus action items for the
    /// `session_complete` frame (§4.9 point 3). Returns `None` on any
    /// provider failure — the live endpoint still has the cleaned
    /// transcript to send.
    pub async fn summarize_for_live(&self, cleaned_transcript: &str) -> Option<LiveSummary> {
        if cleaned_transcript.trim().is_empty() {
            return None;
        }

        let schema = serde_json::json!({
            "type": "object",
            "required": ["summary", "action_items"],
            "properties": {
                "summary": {"type": "string"},
                "action_items": {"type": "array", "items": {"type": "string"}},
            },
        });

        let result = self
            .llm
            .complete_structured(
                LIVE_SUMMARY_SYSTEM_PROMPT,
                &live_summary_user_prompt(cleaned_transcript),
                "live_session_summary",
                &schema,
                1,
                LIVE_SUMMARY_TIMEOUT,
            )
            .await;

        match result {
            Ok(value) => serde_json::from_value::<LiveSummaryPayload>(value)
                .ok()
                .map(|p| LiveSummary {
                    summary: p.summary,
                    action_items: p.action_items,
                }),
            Err(e) => {
                warn!(error = %e, "live summary extraction failed");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiveSummaryPayload {
    summary: String,
    #[serde(default)]
    action_items: Vec<String>,
}

/// Monitored, not enforced (the LLM output is free text): logs a warning if
/// the cleaned chunk contains a word absent from the input (§4.5 "must not
/// introduce words").
fn warn_if_introduces_words(original: &str, cleaned: &str) {
    let original_words: HashSet<String> = words_lowercased(original);
    let introduced: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| !original_words.contains(&normalize_word(w)))
        .collect();
    if introduced.len() > original_words.len() / 2 + 3 {
        warn!(count = introduced.len(), "cleaned chunk introduced many unseen words");
    }
}

fn warn_if_prefix_dropped(original: &str, cleaned: &str) {
    if let Some((label, _)) = original.split_once(':') {
        if label.starts_with("SPEAKER") && !cleaned.trim_start().starts_with(label) {
            warn!(label, "cleaned chunk dropped its speaker prefix");
        }
    }
}

fn words_lowercased(s: &str) -> HashSet<String> {
    s.split_whitespace().map(|w| normalize_word(w)).collect()
}

fn normalize_word(w: &str) -> String {
    w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ingestgate_core::error::Result;

    struct EchoLlm;
    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete_text(&self, _system: &str, user: &str, _timeout: Duration) -> Result<String> {
            Ok(user.replace("Clean this transcript turn:\n\n", ""))
        }

        async fn complete_structured(
            &self,
            _system: &str,
            _user: &str,
            _schema_name: &str,
            _schema: &serde_json::Value,
            _max_retries: u32,
            _timeout: Duration,
        ) -> Result<serde_json::Value> {
            Ok(serde_json::json!({"summary": "Team discussed the roadmap.", "action_items": ["Follow up with design"]}))
        }

        fn model(&self) -> &str {
            "echo"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    struct FailingLlm;
    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete_text(&self, _system: &str, _user: &str, _timeout: Duration) -> Result<String> {
            Err(ingestgate_core::error::Error::Internal("boom".to_string()))
        }

        async fn complete_structured(
            &self,
            _system: &str,
            _user: &str,
            _schema_name: &str,
            _schema: &serde_json::Value,
            _max_retries: u32,
            _timeout: Duration,
        ) -> Result<serde_json::Value> {
            Err(ingestgate_core::error::Error::Internal("boom".to_string()))
        }

        fn model(&self) -> &str {
            "failing"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    fn test_metrics() -> Arc<Metrics> {
        Arc::new(Metrics::new().unwrap())
    }

    #[tokio::test]
    async fn clean_joins_cleaned_chunks_with_newline() {
        let cleaner = Cleaner::new(Arc::new(EchoLlm), test_metrics());
        let raw = "SPEAKER_0: um hello there\nSPEAKER_1: hi back";
        let cleaned = cleaner.clean(raw).await;
        assert_eq!(cleaned, raw);
    }

    #[tokio::test]
    async fn clean_falls_back_to_original_chunk_on_llm_failure() {
        let metrics = test_metrics();
        let cleaner = Cleaner::new(Arc::new(FailingLlm), metrics.clone());
        let raw = "SPEAKER_0: um hello there";
        let cleaned = cleaner.clean(raw).await;
        assert_eq!(cleaned, raw);
        assert_eq!(
            metrics
                .cleaner_fallbacks_total
                .with_label_values(&["llm_error"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn empty_transcript_cleans_to_empty() {
        let cleaner = Cleaner::new(Arc::new(EchoLlm), test_metrics());
        assert_eq!(cleaner.clean("   ").await, "");
    }

    #[tokio::test]
    async fn live_summary_parses_structured_response() {
        let cleaner = Cleaner::new(Arc::new(EchoLlm), test_metrics());
        let summary = cleaner.summarize_for_live("SPEAKER_0: hello").await.unwrap();
        assert_eq!(summary.summary, "Team discussed the roadmap.");
        assert_eq!(summary.action_items, vec!["Follow up with design".to_string()]);
    }

    #[tokio::test]
    async fn live_summary_returns_none_on_failure() {
        let cleaner = Cleaner::new(Arc::new(FailingLlm), test_metrics());
        assert!(cleaner.summarize_for_live("SPEAKER_0: hello").await.is_none());
    }
}
