//! Base LLM trait and message helpers.
//!
//! Every chat-completion backend implements [`BaseLLM`]; the consultation
//! pipeline only ever talks to it through `Arc<dyn BaseLLM>` so tests can
//! substitute scripted models.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A single chat message, `{"role": ..., "content": ...}`.
pub type LLMMessage = HashMap<String, Value>;

/// Build an [`LLMMessage`].
pub fn message(role: &str, content: impl Into<String>) -> LLMMessage {
    HashMap::from([
        ("role".to_string(), Value::String(role.to_string())),
        ("content".to_string(), Value::String(content.into())),
    ])
}

/// Per-call generation parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CallOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl CallOptions {
    pub fn new(temperature: f64, max_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenAI API key not set. Set OPENAI_API_KEY.")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by provider (429)")]
    RateLimited,

    #[error("Provider server error: {0}")]
    Server(u16),

    #[error("Provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse provider response: {0}")]
    Decode(String),

    #[error("Provider returned no content")]
    EmptyResponse,
}

/// Chat-completion backend.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Run one completion and return the text content.
    async fn acall(&self, messages: Vec<LLMMessage>, options: CallOptions) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shape() {
        let msg = message("user", "Namaste");
        assert_eq!(msg["role"], "user");
        assert_eq!(msg["content"], "Namaste");
        assert_eq!(msg.len(), 2);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LlmError::Server(502).to_string(), "Provider server error: 502");
        assert_eq!(
            LlmError::Api { status: 400, body: "bad".into() }.to_string(),
            "Provider API error (400): bad"
        );
    }
}
