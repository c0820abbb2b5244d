//! Structured-output LLM client, shared by the cleaner and the intelligence
//! extractor so retry/timeout handling lives in exactly one place.

use async_trait::async_trait;
use ingestgate_core::error::{Error, Result};
use ingestgate_core::ports::LlmClient;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::{create_client, HttpClientConfig};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        }
    }
}

pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http = create_client(&HttpClientConfig::default())
            .map_err(|e| Error::Internal(format!("failed to build LLM http client: {e}")))?;
        Ok(Self { http, config })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn chat(&self, body: &Value, timeout: Duration) -> Result<Value> {
        let response = tokio::time::timeout(
            timeout,
            self.http
                .post(self.chat_url())
                .bearer_auth(&self.config.api_key)
                .json(body)
                .send(),
        )
        .await
        .map_err(|_| Error::Internal("llm request timed out".to_string()))?
        .map_err(|e| Error::Internal(format!("llm request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "llm provider returned {status}: {}",
                truncate(&body, 200)
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Internal(format!("llm response not valid json: {e}")))
    }

    fn extract_content(response: &Value) -> Result<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Internal("llm response missing message content".to_string()))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        &s[..max]
    }
}

/// Checks the top-level keys named in `schema.required` are present. This is
/// deliberately shallow — full JSON Schema validation is out of scope, the
/// point is catching a provider that ignored the schema outright.
fn satisfies_shape(value: &Value, schema: &Value) -> bool {
    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return value.is_object();
    };
    let Some(obj) = value.as_object() else {
        return false;
    };
    required
        .iter()
        .filter_map(Value::as_str)
        .all(|key| obj.contains_key(key))
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete_text(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        timeout: Duration,
    ) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
        });
        let response = self.chat(&body, timeout).await?;
        Self::extract_content(&response)
    }

    async fn complete_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_name: &str,
        json_schema: &Value,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Value> {
        let mut last_err = None;
        for attempt in 0..=max_retries {
            let body = serde_json::json!({
                "model": self.config.model,
                "messages": [
                    ChatMessage { role: "system", content: system_prompt },
                    ChatMessage { role: "user", content: user_prompt },
                ],
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": schema_name,
                        "schema": json_schema,
                        "strict": true,
                    },
                },
            });

            let outcome = self.chat(&body, timeout).await.and_then(|response| {
                let content = Self::extract_content(&response)?;
                serde_json::from_str::<Value>(&content)
                    .map_err(|e| Error::Internal(format!("llm returned invalid json: {e}")))
            });

            match outcome {
                Ok(value) if satisfies_shape(&value, json_schema) => return Ok(value),
                Ok(value) => {
                    warn!(schema_name, attempt, "llm output did not match required shape, retrying");
                    last_err = Some(Error::Internal(format!(
                        "llm output for {schema_name} missing required fields: {value}"
                    )));
                }
                Err(e) => {
                    debug!(schema_name, attempt, error = %e, "structured llm call failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| Error::Internal("structured llm call exhausted retries".to_string())))
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfies_shape_requires_all_named_keys() {
        let schema = serde_json::json!({"required": ["summaries", "action_items"]});
        let ok = serde_json::json!({"summaries": {}, "action_items": []});
        let missing = serde_json::json!({"summaries": {}});
        assert!(satisfies_shape(&ok, &schema));
        assert!(!satisfies_shape(&missing, &schema));
    }

    #[test]
    fn satisfies_shape_without_required_just_checks_object() {
        let schema = serde_json::json!({"type": "object"});
        assert!(satisfies_shape(&serde_json::json!({}), &schema));
        assert!(!satisfies_shape(&serde_json::json!([1, 2]), &schema));
    }

    #[test]
    fn truncate_never_panics_on_short_strings() {
        assert_eq!(truncate("hi", 200), "hi");
    }
}
