//! The immutable user query that flows through one pipeline invocation

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Self-reported stress level, used to tune prompt framing and routing depth
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    #[default]
    Moderate,
    High,
    Critical,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A media blob attached to a query (image or audio), base64-encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Verify the payload is valid base64
    pub fn validate(&self) -> Result<(), DomainError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map(|_| ())
            .map_err(|_| DomainError::validation("Attachment data is not valid base64"))
    }
}

/// A user query, immutable once created and scoped to one pipeline invocation
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub attachments: Vec<Attachment>,
    pub stress_level: StressLevel,
    /// Correlation id for logging; not used for cross-request state
    pub conversation_id: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
            stress_level: StressLevel::default(),
            conversation_id: format!("conv_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_stress_level(mut self, level: StressLevel) -> Self {
        self.stress_level = level;
        self
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = id.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// A query is multimodal when it carries any attachment
    pub fn is_multimodal(&self) -> bool {
        !self.attachments.is_empty()
    }
}
