//! Retrieval over the local astrology rule corpus.
//!
//! Rule files are chunked, embedded through an external embeddings API and
//! kept in memory; queries return the top-k chunks by cosine similarity.

pub mod embeddings;
pub mod knowledge_base;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use embeddings::{Embedder, OpenAIEmbeddings};
pub use knowledge_base::KnowledgeBase;
pub use types::{DocumentChunk, SearchResult};

/// Chunks returned per query.
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Cannot read {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("No knowledge documents found in {0}")]
    NoDocuments(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embeddings API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Expected {expected} embeddings, got {actual}")]
    EmbeddingCount { expected: usize, actual: usize },

    #[error("Embeddings API returned no vector")]
    EmptyEmbedding,
}

/// Top-k semantic lookup.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>, RagError>;
}
