use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for embedding providers used by the retriever
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a text into a dense vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Embedding vector dimensions
    fn dimensions(&self) -> usize;
}
