//! Retrieval record and result types.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One embedded chunk of a knowledge file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// SHA-256 of source and content, hex encoded.
    pub doc_id: String,
    pub content: String,
    /// File name the chunk came from.
    pub source: String,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl DocumentChunk {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        let source = source.into();
        let content = content.into();
        Self {
            doc_id: content_id(&source, &content),
            content,
            source,
            embedding: Vec::new(),
        }
    }
}

/// Content-addressed id for a chunk.
pub fn content_id(source: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0]);
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// A chunk scored against a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub doc_id: String,
    pub content: String,
    pub source: String,
    /// Cosine similarity, -1.0 to 1.0.
    pub score: f32,
}
