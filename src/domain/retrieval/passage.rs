use serde::{Deserialize, Serialize};

/// A passage returned by the knowledge retriever.
///
/// Has no identity beyond the request that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    /// Source identifier (usually the corpus file name)
    pub source: String,
    /// Relevance score in [0, 1], higher is more relevant
    pub score: f32,
}

impl RetrievedPassage {
    pub fn new(text: impl Into<String>, source: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            score,
        }
    }
}
