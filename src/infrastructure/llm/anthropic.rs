use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::generation::{GenerationRequest, LlmBackend};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API backend
#[derive(Debug)]
pub struct AnthropicBackend<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> AnthropicBackend<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let mut content = vec![serde_json::json!({
            "type": "text",
            "text": request.prompt,
        })];

        for attachment in &request.attachments {
            content.push(serde_json::json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": attachment.mime_type,
                    "data": attachment.data,
                }
            }));
        }

        serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": content }],
            "max_tokens": request.params.max_tokens,
            "temperature": request.params.temperature,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: MessagesResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::backend_transport("anthropic", format!("Failed to parse response: {}", e))
        })?;

        let text = response
            .content
            .into_iter()
            .filter_map(|block| {
                if block.content_type == "text" {
                    block.text
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(DomainError::backend_transport(
                "anthropic",
                "Response contained no text blocks",
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmBackend for AnthropicBackend<C> {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, DomainError> {
        let body = self.build_body(request);
        let response = self
            .client
            .post_json("anthropic", &self.messages_url(), self.headers(), &body)
            .await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }
}

// Anthropic API types

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::Attachment;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.anthropic.com/v1/messages";

    fn canned_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [{ "type": "text", "text": text }],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 10, "output_tokens": 5 }
        })
    }

    #[tokio::test]
    async fn test_anthropic_complete() {
        let client = MockHttpClient::new().with_response(TEST_URL, canned_response("A reflection"));
        let backend = AnthropicBackend::new(client, "test-key", "claude-sonnet-4-20250514");

        let result = backend
            .complete(&GenerationRequest::new("Reflect on this"))
            .await
            .unwrap();

        assert_eq!(result, "A reflection");
    }

    #[tokio::test]
    async fn test_anthropic_attachments_become_image_blocks() {
        let client = MockHttpClient::new().with_response(TEST_URL, canned_response("A drawing"));
        let backend = AnthropicBackend::new(client, "test-key", "claude-sonnet-4-20250514");

        let request = GenerationRequest::new("Describe this")
            .with_attachments(vec![Attachment::new("image/jpeg", "ZGF0YQ==")]);

        backend.complete(&request).await.unwrap();

        let requests = backend.client.requests();
        let content = &requests[0]["messages"][0]["content"];
        assert_eq!(content[1]["type"], "image");
        assert_eq!(content[1]["source"]["media_type"], "image/jpeg");
    }

    #[tokio::test]
    async fn test_anthropic_custom_base_url() {
        let custom_url = "http://localhost:8081/v1/messages";
        let client = MockHttpClient::new().with_response(custom_url, canned_response("local"));
        let backend = AnthropicBackend::with_base_url(
            client,
            "test-key",
            "claude-sonnet-4-20250514",
            "http://localhost:8081",
        );

        let result = backend
            .complete(&GenerationRequest::new("hi"))
            .await
            .unwrap();

        assert_eq!(result, "local");
    }
}
