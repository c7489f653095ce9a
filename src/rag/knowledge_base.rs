//! In-memory vector index over the rule files in the knowledge directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::embeddings::Embedder;
use super::types::{DocumentChunk, SearchResult};
use super::{RagError, Retriever};

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 100;

const KNOWLEDGE_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Sliding-window chunking over characters.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Knowledge files directly under `dir`, sorted by name.
pub async fn knowledge_files(dir: &Path) -> Result<Vec<PathBuf>, RagError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| RagError::Io(dir.display().to_string(), e))?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| RagError::Io(dir.display().to_string(), e))?
    {
        let path = entry.path();
        let wanted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| KNOWLEDGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if wanted && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Embedded chunks plus the embedder used for queries.
pub struct KnowledgeBase {
    chunks: Vec<DocumentChunk>,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

impl KnowledgeBase {
    /// Read, chunk and embed every knowledge file in `dir`.
    pub async fn load(dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self, RagError> {
        let mut chunks = Vec::new();
        for path in knowledge_files(dir).await? {
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) => {
                    log::error!("Error loading {}: {}", path.display(), e);
                    continue;
                }
            };
            let pieces = chunk_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
            log::info!("Loaded knowledge file {} ({} chunks)", source, pieces.len());
            chunks.extend(pieces.into_iter().map(|piece| DocumentChunk::new(&source, piece)));
        }
        if chunks.is_empty() {
            return Err(RagError::NoDocuments(dir.display().to_string()));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder.embed_documents(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(RagError::EmbeddingCount {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }
        for (chunk, vector) in chunks.iter_mut().zip(vectors) {
            chunk.embedding = vector;
        }
        log::info!("Knowledge base ready with {} chunks", chunks.len());
        Ok(Self { chunks, embedder })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl Retriever for KnowledgeBase {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>, RagError> {
        let query_vector = self.embedder.embed_query(query).await?;
        let mut scored: Vec<SearchResult> = self
            .chunks
            .iter()
            .map(|chunk| SearchResult {
                doc_id: chunk.doc_id.clone(),
                content: chunk.content.clone(),
                source: chunk.source.clone(),
                score: cosine_similarity(&query_vector, &chunk.embedding),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Embeds text as keyword counts so similarity is predictable.
    pub(crate) struct KeywordEmbedder;

    const AXES: [&str; 3] = ["marriage", "career", "health"];

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    AXES.iter().map(|axis| lower.matches(axis).count() as f32).collect()
                })
                .collect())
        }
    }

    #[test]
    fn test_chunking_overlaps() {
        let text: String = ('a'..='z').cycle().take(2500).collect();
        let chunks = chunk_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1000);
        let tail: String = chunks[0].chars().skip(900).collect();
        let head: String = chunks[1].chars().take(100).collect();
        assert_eq!(tail, head);
        assert_eq!(chunks[2].chars().count(), 700);
    }

    #[test]
    fn test_chunking_multibyte_text() {
        let text = "ॐ".repeat(1500);
        let chunks = chunk_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().all(|ch| ch == 'ॐ')));
        assert!(chunk_text("", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
        assert_eq!(chunk_text("short", CHUNK_SIZE, CHUNK_OVERLAP), vec!["short"]);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_load_and_retrieve_top_k() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_marriage.md"), "Marriage timing via 7th cusp. marriage").unwrap();
        std::fs::write(dir.path().join("b_career.txt"), "Career and profession via 10th cusp.").unwrap();
        std::fs::write(dir.path().join("c_health.txt"), "Health via 6th cusp.").unwrap();
        std::fs::write(dir.path().join("ignored.docx"), "marriage marriage marriage").unwrap();

        let kb = KnowledgeBase::load(dir.path(), Arc::new(KeywordEmbedder)).await.unwrap();
        assert_eq!(kb.len(), 3);

        let results = kb.retrieve("When is my marriage?", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "a_marriage.md");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = KnowledgeBase::load(dir.path(), Arc::new(KeywordEmbedder)).await.unwrap_err();
        assert!(matches!(err, RagError::NoDocuments(_)));

        let missing = dir.path().join("nope");
        let err = KnowledgeBase::load(&missing, Arc::new(KeywordEmbedder)).await.unwrap_err();
        assert!(matches!(err, RagError::Io(_, _)));
    }
}
