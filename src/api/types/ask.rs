//! Request and response types for the /ask endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::query::{Attachment, Query, StressLevel};
use crate::domain::routing::BackendId;
use crate::domain::PipelineResponse;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 2000, message = "query must be 1 to 2000 characters"))]
    pub query: String,

    #[serde(default)]
    pub stress_level: Option<StressLevel>,

    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,

    pub conversation_id: Option<String>,

    #[validate(range(min = 100, max = 4000, message = "max_tokens must be 100 to 4000"))]
    pub max_tokens: Option<u32>,

    #[validate(range(min = 0.0, max = 1.0, message = "temperature must be 0.0 to 1.0"))]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentPayload {
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

impl AskRequest {
    pub fn into_query(self) -> Query {
        let mut query = Query::new(self.query);

        if let Some(level) = self.stress_level {
            query = query.with_stress_level(level);
        }
        if let Some(id) = self.conversation_id {
            query = query.with_conversation_id(id);
        }
        if let Some(max_tokens) = self.max_tokens {
            query = query.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            query = query.with_temperature(temperature);
        }
        for attachment in self.attachments {
            query = query.with_attachment(Attachment::new(attachment.mime_type, attachment.data));
        }

        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub response_id: String,
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    /// Absent when no backend produced the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_used: Option<BackendId>,
    pub blocked: bool,
    pub degraded: bool,
    pub sources: Vec<SourceInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub source: String,
    pub score: f32,
}

impl AskResponse {
    pub fn from_pipeline(conversation_id: String, response: PipelineResponse) -> Self {
        Self {
            response_id: format!("resp_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
            conversation_id,
            created_at: Utc::now(),
            content: response.content,
            backend_used: response.backend_used,
            blocked: response.blocked,
            degraded: response.degraded,
            sources: response
                .sources
                .into_iter()
                .map(|p| SourceInfo {
                    source: p.source,
                    score: p.score,
                })
                .collect(),
        }
    }
}
