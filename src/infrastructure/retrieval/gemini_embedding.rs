//! Embedding provider backed by the Gemini embedContent API

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::retrieval::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug)]
pub struct GeminiEmbedding<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl<C: HttpClientTrait> GeminiEmbedding<C> {
    pub fn new(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: model.into(),
            dimensions,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn embed_url(&self) -> String {
        format!("{}/v1beta/models/{}:embedContent", self.base_url, self.model)
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for GeminiEmbedding<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = serde_json::json!({
            "content": { "parts": [{ "text": text }] }
        });

        let response = self
            .client
            .post_json(
                "gemini-embedding",
                &self.embed_url(),
                vec![
                    ("x-goog-api-key", self.api_key.as_str()),
                    ("Content-Type", "application/json"),
                ],
                &body,
            )
            .await
            .map_err(|e| DomainError::retrieval_unavailable(e.to_string()))?;

        let parsed: EmbedContentResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::retrieval_unavailable(format!("Failed to parse response: {}", e))
        })?;

        Ok(parsed.embedding.values)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Embedding,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:embedContent";

    #[tokio::test]
    async fn test_embed_parses_values() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({ "embedding": { "values": [0.1, 0.2, 0.3] } }),
        );
        let provider = GeminiEmbedding::new(client, "test-key", "text-embedding-004", 3);

        let vector = provider.embed("some text").await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        assert_eq!(provider.dimensions(), 3);
    }

    #[tokio::test]
    async fn test_transport_error_maps_to_retrieval_unavailable() {
        let client = MockHttpClient::new().with_error(TEST_URL, "connection refused");
        let provider = GeminiEmbedding::new(client, "test-key", "text-embedding-004", 768);

        let error = provider.embed("some text").await.unwrap_err();

        assert!(matches!(error, DomainError::RetrievalUnavailable { .. }));
    }
}
