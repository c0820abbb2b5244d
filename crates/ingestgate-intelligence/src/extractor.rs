//! §4.6.1 extraction: one structured-output LLM call, never propagating a
//! failure — the orchestrator's Lane I treats a `None` as "nothing to
//! persist" rather than an error.

use std::sync::Arc;
use std::time::Duration;

use ingestgate_core::intelligence::InteractionAnalysis;
use ingestgate_core::ports::LlmClient;
use tracing::warn;

use crate::prompt::{user_prompt, LONG_TRANSCRIPT_WORD_THRESHOLD, SYSTEM_PROMPT};
use crate::schema::interaction_analysis_schema;

const SHORT_TIMEOUT: Duration = Duration::from_secs(30);
const LONG_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_RETRIES: u32 = 2;
const SCHEMA_NAME: &str = "interaction_analysis";

pub struct IntelligenceExtractor {
    llm: Arc<dyn LlmClient>,
}

impl IntelligenceExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, cleaned_transcript: &str) -> Option<InteractionAnalysis> {
        if cleaned_transcript.trim().is_empty() {
            return None;
        }

        let timeout = if cleaned_transcript.split_whitespace().count() > LONG_TRANSCRIPT_WORD_THRESHOLD {
            LONG_TIMEOUT
        } else {
            SHORT_TIMEOUT
        };

        let schema = interaction_analysis_schema();
        let result = self
            .llm
            .complete_structured(
                SYSTEM_PROMPT,
                &user_prompt(cleaned_transcript),
                SCHEMA_NAME,
                &schema,
                MAX_RETRIES,
                timeout,
            )
            .await;

        match result {
            Ok(value) => match serde_json::from_value::<InteractionAnalysis>(value) {
                Ok(analysis) => Some(analysis),
                Err(err) => {
                    warn!(error = %err, "extraction result did not match InteractionAnalysis shape");
                    None
                }
            },
            Err(err) => {
                warn!(error = %err, "intelligence extraction failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ingestgate_core::error::Result;
    use serde_json::json;

    struct StaticLlm(serde_json::Value);

    #[async_trait]
    impl LlmClient for StaticLlm {
        async fn complete_text(&self, _: &str, _: &str, _: Duration) -> Result<String> {
            Ok(String::new())
        }

        async fn complete_structured(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &serde_json::Value,
            _: u32,
            _: Duration,
        ) -> Result<serde_json::Value> {
            Ok(self.0.clone())
        }

        fn model(&self) -> &str {
            "test-model"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    #[tokio::test]
    async fn empty_transcript_short_circuits_without_calling_the_llm() {
        let extractor = IntelligenceExtractor::new(Arc::new(StaticLlm(json!({}))));
        assert!(extractor.extract("   ").await.is_none());
    }

    #[tokio::test]
    async fn well_formed_response_parses_into_interaction_analysis() {
        let value = json!({
            "summaries": {
                "title": "t", "headline": "h", "brief": "b", "detailed": "d", "spotlight": "s"
            },
            "action_items": [],
            "decisions": [],
            "risks": [],
            "key_takeaways": ["saved budget"],
            "product_feedback": [],
            "market_intelligence": []
        });
        let extractor = IntelligenceExtractor::new(Arc::new(StaticLlm(value)));
        let analysis = extractor.extract("SPEAKER_0: hello world").await.unwrap();
        assert_eq!(analysis.key_takeaways, vec!["saved budget".to_string()]);
    }

    #[tokio::test]
    async fn malformed_response_returns_none_instead_of_panicking() {
        let extractor = IntelligenceExtractor::new(Arc::new(StaticLlm(json!({"nonsense": true}))));
        assert!(extractor.extract("SPEAKER_0: hello world").await.is_none());
    }
}
