//! Generation request/result types and the backend collaborator contract

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::query::Attachment;
use crate::domain::routing::BackendId;
use crate::domain::DomainError;

/// How much reasoning effort the caller wants from the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    #[default]
    Fast,
    Deep,
}

/// Generation tuning parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// One generation call, built by the pipeline and consumed once by the router
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub attachments: Vec<Attachment>,
    pub params: GenerationParams,
    pub depth: Depth,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attachments: Vec::new(),
            params: GenerationParams::default(),
            depth: Depth::default(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    pub fn is_multimodal(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// Terminal artifact of one successful router invocation
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub content: String,
    pub backend: BackendId,
    pub latency: Duration,
    /// True when a lower-ranked backend produced the result
    pub fallback_used: bool,
}

/// Contract every LLM backend adapter implements (Gemini, Anthropic, Gemma, ...)
#[async_trait]
pub trait LlmBackend: Send + Sync + Debug {
    /// Issue one completion call and return the generated text
    async fn complete(&self, request: &GenerationRequest) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("Explain news fatigue")
            .with_params(GenerationParams {
                max_tokens: 500,
                temperature: 0.3,
            })
            .with_depth(Depth::Deep);

        assert_eq!(request.params.max_tokens, 500);
        assert_eq!(request.depth, Depth::Deep);
        assert!(!request.is_multimodal());
    }

    #[tokio::test]
    async fn test_mock_backend_script_then_default() {
        let backend = mock::MockBackend::new("mock")
            .with_reply("fallback text")
            .with_script(vec![Err("boom".to_string())]);

        let request = GenerationRequest::new("hi");

        assert!(backend.complete(&request).await.is_err());
        assert_eq!(
            backend.complete(&request).await.unwrap(),
            "fallback text"
        );
        assert_eq!(backend.calls(), 2);
    }
}
