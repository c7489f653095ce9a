//! Grounded consultation: classify, age-gate, retrieve, prompt, generate.

pub mod basic;
pub mod prompt;

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::classify::{classify_prediction_topic, follow_up_instruction, should_append_remedies};
use crate::llms::ResponseOrchestrator;
use crate::prediction::compact::truncate_chars;
use crate::prediction::{compact_chart_json, PredictionContext};
use crate::rag::{Retriever, DEFAULT_TOP_K};
use crate::remedies::generate_remedies;

pub use basic::{basic_response, OFFLINE_REPLY};
pub use prompt::{build_consultation_prompt, PromptParts};

/// Retrieved rule text handed to the prompt is capped at this many chars.
pub const KNOWLEDGE_CONTEXT_LIMIT: usize = 2000;

/// Answers questions, with or without a chart and a model.
#[derive(Clone)]
pub struct ConsultationService {
    orchestrator: Option<Arc<ResponseOrchestrator>>,
    retriever: Option<Arc<dyn Retriever>>,
    current_year: i32,
    follow_up_seed: Option<u64>,
}

impl ConsultationService {
    pub fn new(
        orchestrator: Option<ResponseOrchestrator>,
        retriever: Option<Arc<dyn Retriever>>,
        current_year: i32,
    ) -> Self {
        Self {
            orchestrator: orchestrator.map(Arc::new),
            retriever,
            current_year,
            follow_up_seed: None,
        }
    }

    /// Pin the follow-up selection instead of deriving it from the clock.
    pub fn with_follow_up_seed(mut self, seed: u64) -> Self {
        self.follow_up_seed = Some(seed);
        self
    }

    pub fn rag_enabled(&self) -> bool {
        self.retriever.is_some()
    }

    pub fn llm_enabled(&self) -> bool {
        self.orchestrator.is_some()
    }

    fn seed(&self) -> u64 {
        self.follow_up_seed
            .unwrap_or_else(|| Utc::now().timestamp().rem_euclid(1000) as u64)
    }

    /// Top chunks for `question`, joined and capped. Empty on any failure.
    pub async fn retrieval_context(&self, question: &str) -> String {
        let Some(retriever) = &self.retriever else {
            return String::new();
        };
        match retriever.retrieve(question, DEFAULT_TOP_K).await {
            Ok(results) => {
                let joined = results
                    .iter()
                    .map(|r| r.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                truncate_chars(&joined, KNOWLEDGE_CONTEXT_LIMIT).to_string()
            }
            Err(e) => {
                log::warn!("[RAG] retrieval failed, continuing without context: {}", e);
                String::new()
            }
        }
    }

    /// Chart-grounded answer. Falls back to the offline sentence without a model.
    pub async fn consult(&self, question: &str, chart_data: &Value) -> String {
        let Some(orchestrator) = &self.orchestrator else {
            return OFFLINE_REPLY.to_string();
        };

        let topic = classify_prediction_topic(question);
        let context = PredictionContext::build(topic, chart_data, self.current_year);
        let chart_context = compact_chart_json(chart_data, context.birth_date);
        let knowledge_context = self.retrieval_context(question).await;
        let follow_up = follow_up_instruction(topic, self.seed());
        let remedies = if should_append_remedies(question) {
            generate_remedies(question, true)
        } else {
            String::new()
        };
        let user_name = chart_data
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("User");

        log::debug!(
            "[AI] topic={} remedies={} knowledge_chars={}",
            topic.style_label(),
            !remedies.is_empty(),
            knowledge_context.chars().count()
        );

        let prompt = build_consultation_prompt(&PromptParts {
            question,
            user_name,
            context: &context,
            chart_context: &chart_context,
            knowledge_context: &knowledge_context,
            follow_up: &follow_up,
            remedies: &remedies,
        });
        orchestrator.generate(&prompt).await
    }

    /// Chat reply: grounded when a chart and a model are available, canned otherwise.
    pub async fn chat(&self, message: &str, chart_data: Option<&Value>) -> String {
        match chart_data {
            Some(chart) if self.llm_enabled() && !chart.is_null() => {
                self.consult(message, chart).await
            }
            _ => basic_response(message).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::orchestrator::tests::ScriptedLLM;
    use crate::rag::{RagError, SearchResult};
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedRetriever(Option<Vec<&'static str>>);

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<SearchResult>, RagError> {
            let Some(texts) = &self.0 else {
                return Err(RagError::EmptyEmbedding);
            };
            Ok(texts
                .iter()
                .take(k)
                .enumerate()
                .map(|(i, t)| SearchResult {
                    doc_id: i.to_string(),
                    content: t.to_string(),
                    source: "rules.md".into(),
                    score: 1.0 - i as f32 / 10.0,
                })
                .collect())
        }
    }

    fn service(reply: Option<&'static str>) -> (ConsultationService, Arc<ScriptedLLM>) {
        let primary = ScriptedLLM::new("gpt-4-turbo", reply);
        let fallback = ScriptedLLM::new("gpt-4o-mini", reply);
        let orchestrator = ResponseOrchestrator::new(primary.clone(), fallback);
        let svc = ConsultationService::new(Some(orchestrator), None, 2025).with_follow_up_seed(0);
        (svc, primary)
    }

    #[tokio::test]
    async fn test_consult_builds_grounded_prompt() {
        let (svc, primary) = service(Some("Shri Sitaram"));
        let chart = json!({"name": "Ravi", "dob_date": "1990-06-15", "planets": {"1": ["Su"]}});

        let answer = svc.consult("Meri job kab lagegi? bahut tension hai", &chart).await;
        assert_eq!(answer, "Shri Sitaram");

        let prompts = primary.prompts();
        let prompt = &prompts[0];
        assert!(prompt.contains("Aapka sawaal uttam hai, Ravi ji"));
        assert!(prompt.contains("User was born in 1990"));
        assert!(prompt.contains("Response style: career_guidance"));
        assert!(prompt.contains("MANDATORY: You MUST include these EXACT remedies"));
        assert!(prompt.contains(follow_up_instruction(classify_prediction_topic("job"), 0).as_str()));
    }

    #[tokio::test]
    async fn test_consult_without_distress_has_no_remedies() {
        let (svc, primary) = service(Some("ok"));
        svc.consult("Shadi kab hogi?", &json!({})).await;
        let prompts = primary.prompts();
        let prompt = &prompts[0];
        assert!(!prompt.contains("MANDATORY"));
        assert!(prompt.contains("Aapka sawaal uttam hai, User ji"));
        assert!(prompt.contains("User was born in 2000"));
    }

    #[tokio::test]
    async fn test_consult_offline_without_model() {
        let svc = ConsultationService::new(None, None, 2025);
        assert_eq!(svc.consult("career?", &json!({})).await, OFFLINE_REPLY);
        assert!(!svc.rag_enabled());
    }

    #[tokio::test]
    async fn test_chat_routes_between_canned_and_grounded() {
        let (svc, primary) = service(Some("grounded"));
        assert_eq!(svc.chat("namaste", None).await, basic::GREETING_REPLY);
        assert_eq!(svc.chat("career?", Some(&Value::Null)).await, basic_response("career?"));
        assert_eq!(svc.chat("career?", Some(&json!({"name": "A"}))).await, "grounded");
        assert_eq!(primary.prompts().len(), 1);

        let offline = ConsultationService::new(None, None, 2025);
        assert_eq!(
            offline.chat("career?", Some(&json!({"name": "A"}))).await,
            basic_response("career?")
        );
    }

    #[tokio::test]
    async fn test_retrieval_context_is_joined_and_capped() {
        let long: &'static str = Box::leak("k".repeat(3000).into_boxed_str());
        let svc = ConsultationService::new(
            None,
            Some(Arc::new(FixedRetriever(Some(vec!["rule one", "rule two"])))),
            2025,
        );
        assert!(svc.rag_enabled());
        assert_eq!(svc.retrieval_context("q").await, "rule one\n\nrule two");

        let capped = ConsultationService::new(None, Some(Arc::new(FixedRetriever(Some(vec![long])))), 2025);
        assert_eq!(capped.retrieval_context("q").await.chars().count(), KNOWLEDGE_CONTEXT_LIMIT);

        let failing = ConsultationService::new(None, Some(Arc::new(FixedRetriever(None))), 2025);
        assert_eq!(failing.retrieval_context("q").await, "");
    }
}
