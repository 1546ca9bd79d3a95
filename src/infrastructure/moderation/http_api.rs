//! Classifier backed by an external moderation endpoint

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::moderation::{Classification, ContentClassifier, ModerationCategory};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Calls a moderation service with `{"text": ...}` and expects
/// `{"category": ..., "severity": ..., "detail": ...}` back.
///
/// Transport and parse failures surface as `ModerationUnavailable` so the
/// safety gate fails closed.
#[derive(Debug)]
pub struct HttpClassifier<C: HttpClientTrait> {
    client: C,
    endpoint: String,
}

impl<C: HttpClientTrait> HttpClassifier<C> {
    pub fn new(client: C, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> ContentClassifier for HttpClassifier<C> {
    async fn classify(&self, text: &str) -> Result<Classification, DomainError> {
        let body = serde_json::json!({ "text": text });

        let response = self
            .client
            .post_json(
                "moderation",
                &self.endpoint,
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await
            .map_err(|e| DomainError::moderation_unavailable(e.to_string()))?;

        let parsed: ModerationApiResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::moderation_unavailable(format!("Failed to parse response: {}", e))
        })?;

        let mut classification = Classification::new(parsed.category.into(), parsed.severity);
        if let Some(detail) = parsed.detail {
            classification = classification.with_detail(detail);
        }

        Ok(classification)
    }

    fn classifier_name(&self) -> &'static str {
        "http"
    }
}

#[derive(Debug, Deserialize)]
struct ModerationApiResponse {
    category: ApiCategory,
    severity: f32,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ApiCategory {
    Crisis,
    Toxicity,
    OffTopic,
    Benign,
}

impl From<ApiCategory> for ModerationCategory {
    fn from(category: ApiCategory) -> Self {
        match category {
            ApiCategory::Crisis => Self::Crisis,
            ApiCategory::Toxicity => Self::Toxicity,
            ApiCategory::OffTopic => Self::OffTopic,
            ApiCategory::Benign => Self::Benign,
        }
    }
}
