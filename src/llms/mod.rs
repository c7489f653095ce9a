//! LLM layer.
//!
//! - [`base_llm`] - the [`BaseLLM`] trait every chat backend implements
//! - [`providers`] - concrete backends (OpenAI)
//! - [`orchestrator`] - primary/fallback chain with a fixed last-resort answer

pub mod base_llm;
pub mod orchestrator;
pub mod providers;

pub use base_llm::{message, BaseLLM, CallOptions, LLMMessage, LlmError};
pub use orchestrator::{ResponseOrchestrator, CAPACITY_APOLOGY, FALLBACK_PROMPT_LIMIT};
pub use providers::openai::OpenAICompletion;
