//! In-memory vector index over the ethics corpus

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::retrieval::{EmbeddingProvider, KnowledgeRetriever, RetrievedPassage};
use crate::domain::DomainError;

use super::ingest::DocumentChunk;

#[derive(Debug)]
struct StoredChunk {
    text: String,
    source: String,
    vector: Vec<f32>,
}

/// Cosine-similarity index held entirely in memory.
///
/// Populated once at startup from the corpus directory; queries embed the
/// query text and scan all chunks. Embedding failures surface as
/// `RetrievalUnavailable`, which the pipeline treats as non-fatal.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryVectorIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            chunks: RwLock::new(Vec::new()),
        }
    }

    /// Embed and store corpus chunks. Called at startup, before serving.
    pub async fn ingest(&self, chunks: Vec<DocumentChunk>) -> Result<usize, DomainError> {
        let vectors = futures::future::try_join_all(
            chunks.iter().map(|chunk| self.embedder.embed(&chunk.text)),
        )
        .await?;

        let stored: Vec<StoredChunk> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| StoredChunk {
                text: chunk.text,
                source: chunk.source,
                vector,
            })
            .collect();

        let count = stored.len();
        let mut index = self.chunks.write().await;
        index.extend(stored);

        info!(
            chunks = count,
            total = index.len(),
            provider = self.embedder.provider_name(),
            "Corpus chunks indexed"
        );
        Ok(count)
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

#[async_trait]
impl KnowledgeRetriever for InMemoryVectorIndex {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>, DomainError> {
        let query_vector = self.embedder.embed(query).await?;

        let chunks = self.chunks.read().await;
        let mut scored: Vec<RetrievedPassage> = chunks
            .iter()
            .map(|chunk| {
                RetrievedPassage::new(
                    chunk.text.clone(),
                    chunk.source.clone(),
                    cosine_similarity(&query_vector, &chunk.vector),
                )
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retrieval::embedding::mock::MockEmbeddingProvider;

    fn chunk(text: &str, source: &str) -> DocumentChunk {
        DocumentChunk {
            text: text.to_string(),
            source: source.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ingest_and_retrieve() {
        let index = InMemoryVectorIndex::new(Arc::new(MockEmbeddingProvider::new(64)));

        index
            .ingest(vec![
                chunk("On handling news fatigue", "media.md"),
                chunk("On stoic acceptance", "stoicism.md"),
                chunk("On compassion for strangers", "compassion.md"),
            ])
            .await
            .unwrap();

        let results = index.retrieve("news fatigue", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_identical_text_scores_highest() {
        let index = InMemoryVectorIndex::new(Arc::new(MockEmbeddingProvider::new(64)));

        index
            .ingest(vec![
                chunk("exact match text", "a.md"),
                chunk("a totally different passage about something else", "b.md"),
            ])
            .await
            .unwrap();

        let results = index.retrieve("exact match text", 2).await.unwrap();

        assert_eq!(results[0].source, "a.md");
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_k_larger_than_index_returns_everything() {
        let index = InMemoryVectorIndex::new(Arc::new(MockEmbeddingProvider::new(16)));
        index.ingest(vec![chunk("only one", "a.md")]).await.unwrap();

        let results = index.retrieve("anything", 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_surfaces_as_retrieval_unavailable() {
        let index = InMemoryVectorIndex::new(Arc::new(
            MockEmbeddingProvider::new(16).with_error("embedding api down"),
        ));

        let error = index.retrieve("anything", 5).await.unwrap_err();
        assert!(matches!(error, DomainError::RetrievalUnavailable { .. }));
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
    }
}
