//! # AstroRemedis
//!
//! Astrology consultation backend. Free-text questions are classified into
//! topic buckets, grounded in a birth chart from an external provider (or a
//! deterministic mock when the provider is down), age-gated, and answered by
//! a chat model with a fallback model behind it. Form leads land in a Google
//! Sheet.
//!
//! The pure core (`birth`, `classify`, `remedies`, `prediction`) has no I/O;
//! everything that talks to the network lives behind a trait in `chart`,
//! `llms`, `rag` and `storage`.

pub mod birth;
pub mod chart;
pub mod classify;
pub mod consultation;
pub mod llms;
pub mod prediction;
pub mod rag;
pub mod remedies;
pub mod server;
pub mod storage;
pub mod utilities;

pub use birth::{normalize_birth_data, BirthRecord};
pub use classify::{classify_topic, should_append_remedies, TopicBucket};
pub use llms::base_llm::BaseLLM;
pub use remedies::generate_remedies;
pub use utilities::config::Settings;

/// Crate version reported by the service descriptor.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
