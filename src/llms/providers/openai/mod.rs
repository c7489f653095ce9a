//! OpenAI Chat Completions provider.
//!
//! Talks to `{base_url}/chat/completions` via `reqwest`. Each call is a single
//! request; 429, 5xx and other 4xx map to distinct [`LlmError`] variants and
//! the caller decides what happens next.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llms::base_llm::{BaseLLM, CallOptions, LLMMessage, LlmError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat-completion client bound to one model.
#[derive(Debug, Clone)]
pub struct OpenAICompletion {
    pub model: String,
    api_key: Option<String>,
    pub base_url: Option<String>,
    client: reqwest::Client,
}

impl OpenAICompletion {
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            model: model.into(),
            api_key,
            base_url,
            client,
        })
    }

    pub fn api_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Request body for `/chat/completions`.
    pub fn build_request_body(&self, messages: &[LLMMessage], options: CallOptions) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    /// Text of the first choice.
    pub fn parse_completions_response(response: &Value) -> Result<String, LlmError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| LlmError::Decode("no choices in response".to_string()))?;

        if let Some(usage) = response.get("usage") {
            log::debug!(
                "OpenAI token usage: prompt={}, completion={}, total={}",
                usage.get("prompt_tokens").and_then(Value::as_i64).unwrap_or(0),
                usage.get("completion_tokens").and_then(Value::as_i64).unwrap_or(0),
                usage.get("total_tokens").and_then(Value::as_i64).unwrap_or(0),
            );
        }

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content.to_string())
    }

    async fn send_completion(&self, api_key: &str, endpoint: &str, body: &Value) -> Result<String, LlmError> {
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if status.is_server_error() {
            return Err(LlmError::Server(status.as_u16()));
        }

        let text = response.text().await?;
        if status.is_client_error() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| {
            let snippet: String = text.chars().take(500).collect();
            LlmError::Decode(format!("{} - Body: {}", e, snippet))
        })?;
        Self::parse_completions_response(&json)
    }
}

#[async_trait]
impl BaseLLM for OpenAICompletion {
    fn model(&self) -> &str {
        &self.model
    }

    async fn acall(&self, messages: Vec<LLMMessage>, options: CallOptions) -> Result<String, LlmError> {
        log::debug!(
            "OpenAICompletion.acall: model={}, messages={}",
            self.model,
            messages.len()
        );
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let endpoint = format!("{}/chat/completions", self.api_base_url());
        let body = self.build_request_body(&messages, options);

        self.send_completion(api_key, &endpoint, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::base_llm::message;

    fn provider(base_url: Option<&str>) -> OpenAICompletion {
        OpenAICompletion::new(
            "gpt-4-turbo",
            None,
            base_url.map(String::from),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_base_url_default_and_override() {
        assert_eq!(provider(None).api_base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            provider(Some("http://localhost:8080/v1/")).api_base_url(),
            "http://localhost:8080/v1"
        );
    }

    #[test]
    fn test_request_body_carries_options() {
        let llm = provider(None);
        let body = llm.build_request_body(&[message("user", "hi")], CallOptions::new(0.9, 800));
        assert_eq!(body["model"], "gpt-4-turbo");
        assert_eq!(body["temperature"], 0.9);
        assert_eq!(body["max_tokens"], 800);
        assert_eq!(body["messages"][0]["content"], "hi");

        let bare = llm.build_request_body(&[], CallOptions::default());
        assert!(bare.get("temperature").is_none());
        assert!(bare.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_response() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "  Shubh ho  "}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        });
        assert_eq!(
            OpenAICompletion::parse_completions_response(&response).unwrap(),
            "Shubh ho"
        );
        assert!(matches!(
            OpenAICompletion::parse_completions_response(&json!({"choices": []})),
            Err(LlmError::Decode(_))
        ));
        assert!(matches!(
            OpenAICompletion::parse_completions_response(&json!({
                "choices": [{"message": {"content": null}}]
            })),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let err = provider(None)
            .acall(vec![message("user", "hi")], CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
