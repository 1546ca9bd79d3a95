use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::generation::{GenerationRequest, LlmBackend};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Self-hosted Gemma backend speaking the Hugging Face text-generation
/// inference protocol. Text-only; the factory rejects configs that mark
/// a gemma backend multimodal.
#[derive(Debug)]
pub struct GemmaBackend<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key: Option<String>,
}

impl<C: HttpClientTrait> GemmaBackend<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn generate_url(&self) -> String {
        format!("{}/generate", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref key) = self.api_key {
            headers.push(("Authorization", key.as_str()));
        }
        headers
    }

    fn build_body(&self, request: &GenerationRequest) -> serde_json::Value {
        serde_json::json!({
            "inputs": request.prompt,
            "parameters": {
                "max_new_tokens": request.params.max_tokens,
                "temperature": request.params.temperature,
                "return_full_text": false,
            }
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: GenerateResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::backend_transport("gemma", format!("Failed to parse response: {}", e))
        })?;

        if response.generated_text.is_empty() {
            return Err(DomainError::backend_transport(
                "gemma",
                "Response contained no generated text",
            ));
        }

        Ok(response.generated_text)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmBackend for GemmaBackend<C> {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, DomainError> {
        let body = self.build_body(request);
        let response = self
            .client
            .post_json("gemma", &self.generate_url(), self.headers(), &body)
            .await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "gemma"
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generated_text: String,
}
