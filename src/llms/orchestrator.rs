//! Primary-then-fallback completion chain.

use std::sync::Arc;

use super::base_llm::{message, BaseLLM, CallOptions};
use crate::prediction::compact::truncate_chars;

/// Returned when every model in the chain failed.
pub const CAPACITY_APOLOGY: &str =
    "Sorry, I encountered a temporary AI capacity issue. Please ask again in a few seconds.";

/// Prompt budget for the fallback model, in characters.
pub const FALLBACK_PROMPT_LIMIT: usize = 6000;

/// One step of the chain: a model, its options and an optional prompt cap.
#[derive(Debug, Clone)]
struct Attempt {
    llm: Arc<dyn BaseLLM>,
    options: CallOptions,
    prompt_limit: Option<usize>,
}

/// Tries each [`Attempt`] in order and apologizes if all fail.
#[derive(Debug, Clone)]
pub struct ResponseOrchestrator {
    chain: Vec<Attempt>,
}

impl ResponseOrchestrator {
    /// Primary at temperature 0.9 / 800 tokens, then the fallback with
    /// provider defaults and the prompt capped at [`FALLBACK_PROMPT_LIMIT`].
    pub fn new(primary: Arc<dyn BaseLLM>, fallback: Arc<dyn BaseLLM>) -> Self {
        Self {
            chain: vec![
                Attempt {
                    llm: primary,
                    options: CallOptions::new(0.9, 800),
                    prompt_limit: None,
                },
                Attempt {
                    llm: fallback,
                    options: CallOptions::default(),
                    prompt_limit: Some(FALLBACK_PROMPT_LIMIT),
                },
            ],
        }
    }

    /// Send `prompt` as a single user message down the chain, one call per
    /// model. Never fails.
    pub async fn generate(&self, prompt: &str) -> String {
        let mut failures = Vec::new();
        for step in &self.chain {
            let text = match step.prompt_limit {
                Some(limit) => truncate_chars(prompt, limit),
                None => prompt,
            };
            match step.llm.acall(vec![message("user", text)], step.options).await {
                Ok(answer) => return answer,
                Err(e) => {
                    log::warn!("Model {} failed: {}", step.llm.model(), e);
                    failures.push(format!("{}: {}", step.llm.model(), e));
                }
            }
        }
        log::error!("All models failed: {}", failures.join("; "));
        CAPACITY_APOLOGY.to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llms::base_llm::{LLMMessage, LlmError};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Scripted model recording every prompt it receives.
    #[derive(Debug)]
    pub(crate) struct ScriptedLLM {
        pub name: &'static str,
        pub reply: Option<&'static str>,
        pub seen: Mutex<Vec<(String, CallOptions)>>,
    }

    impl ScriptedLLM {
        pub(crate) fn new(name: &'static str, reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.seen.lock().iter().map(|(p, _)| p.clone()).collect()
        }
    }

    #[async_trait]
    impl BaseLLM for ScriptedLLM {
        fn model(&self) -> &str {
            self.name
        }

        async fn acall(
            &self,
            messages: Vec<LLMMessage>,
            options: CallOptions,
        ) -> Result<String, LlmError> {
            let prompt = messages
                .first()
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str())
                .unwrap_or("")
                .to_string();
            self.seen.lock().push((prompt, options));
            self.reply.map(String::from).ok_or(LlmError::Server(503))
        }
    }

    #[tokio::test]
    async fn test_primary_answer_wins() {
        let primary = ScriptedLLM::new("gpt-4-turbo", Some("primary"));
        let fallback = ScriptedLLM::new("gpt-4o-mini", Some("fallback"));
        let orchestrator = ResponseOrchestrator::new(primary.clone(), fallback.clone());

        assert_eq!(orchestrator.generate("prompt").await, "primary");
        assert!(fallback.prompts().is_empty());
        let (_, options) = primary.seen.lock()[0];
        assert_eq!(options, CallOptions::new(0.9, 800));
    }

    #[tokio::test]
    async fn test_fallback_gets_truncated_prompt() {
        let primary = ScriptedLLM::new("gpt-4-turbo", None);
        let fallback = ScriptedLLM::new("gpt-4o-mini", Some("fallback"));
        let orchestrator = ResponseOrchestrator::new(primary.clone(), fallback.clone());

        let prompt = "ज".repeat(FALLBACK_PROMPT_LIMIT + 500);
        assert_eq!(orchestrator.generate(&prompt).await, "fallback");
        assert_eq!(primary.prompts()[0].chars().count(), FALLBACK_PROMPT_LIMIT + 500);
        assert_eq!(fallback.prompts()[0].chars().count(), FALLBACK_PROMPT_LIMIT);
    }

    #[tokio::test]
    async fn test_apology_when_everything_fails() {
        let primary = ScriptedLLM::new("gpt-4-turbo", None);
        let fallback = ScriptedLLM::new("gpt-4o-mini", None);
        let orchestrator = ResponseOrchestrator::new(primary.clone(), fallback.clone());
        assert_eq!(orchestrator.generate("prompt").await, CAPACITY_APOLOGY);
        // each model is asked exactly once, no retries
        assert_eq!(primary.prompts().len(), 1);
        assert_eq!(fallback.prompts().len(), 1);
    }
}
