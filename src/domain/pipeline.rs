//! Response pipeline: moderation, retrieval, generation, and output gating

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::generation::{Depth, GenerationParams, GenerationRequest};
use crate::domain::moderation::{SafetyGate, Verdict};
use crate::domain::query::{Query, StressLevel};
use crate::domain::retrieval::{KnowledgeRetriever, RetrievedPassage};
use crate::domain::routing::{BackendId, ModelRouter};

/// Shown when either moderation gate blocks the exchange
const BLOCKED_MESSAGE: &str = "I can't help with that request. If you're going through a \
difficult time, please consider reaching out to someone you trust or a professional support \
service.";

/// Shown when generation fails on every eligible backend
const FALLBACK_MESSAGE: &str = "I'm having trouble generating a response right now. Please try \
again in a moment. If you need immediate support, please reach out to a trusted person or a \
professional support service.";

/// Requests with a token budget above this are routed to deep-tier backends
const DEEP_MAX_TOKENS: u32 = 2000;

/// Pipeline tuning, loaded from configuration at startup
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Passages requested from the retriever per query
    pub top_k: usize,
    pub default_max_tokens: u32,
    pub default_temperature: f32,
    /// Appended to intervention responses
    pub crisis_resources: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            default_max_tokens: 1000,
            default_temperature: 0.7,
            crisis_resources: vec![
                "International Association for Suicide Prevention: https://www.iasp.info/resources/Crisis_Centres/".to_string(),
                "Crisis Text Line: text HOME to 741741".to_string(),
            ],
        }
    }
}

/// Terminal artifact of one pipeline invocation.
///
/// The pipeline never surfaces an error to its caller; every outcome,
/// including blocked content and total backend failure, is expressed here.
#[derive(Debug, Clone)]
pub struct PipelineResponse {
    pub content: String,
    /// None when no backend produced the content (blocked or fallback)
    pub backend_used: Option<BackendId>,
    pub blocked: bool,
    /// True when retrieval or generation degraded the response
    pub degraded: bool,
    pub sources: Vec<RetrievedPassage>,
}

impl PipelineResponse {
    fn blocked(reason: Option<&str>) -> Self {
        if let Some(reason) = reason {
            debug!(reason, "Exchange blocked");
        }
        Self {
            content: BLOCKED_MESSAGE.to_string(),
            backend_used: None,
            blocked: true,
            degraded: false,
            sources: Vec::new(),
        }
    }
}

/// Orchestrates one query end to end: input gate, retrieval, generation,
/// output gate. Stateless across invocations.
#[derive(Debug)]
pub struct ResponsePipeline {
    gate: SafetyGate,
    retriever: Arc<dyn KnowledgeRetriever>,
    router: Arc<ModelRouter>,
    config: PipelineConfig,
}

impl ResponsePipeline {
    pub fn new(
        gate: SafetyGate,
        retriever: Arc<dyn KnowledgeRetriever>,
        router: Arc<ModelRouter>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            gate,
            retriever,
            router,
            config,
        }
    }

    pub async fn process(&self, query: &Query) -> PipelineResponse {
        let input_verdict = self.gate.moderate(&query.text).await;

        match input_verdict.verdict {
            Verdict::Blocked => {
                info!(
                    conversation_id = %query.conversation_id,
                    severity = input_verdict.severity,
                    "Input blocked, skipping generation"
                );
                return PipelineResponse::blocked(input_verdict.reason.as_deref());
            }
            Verdict::NeedsIntervention => {
                info!(
                    conversation_id = %query.conversation_id,
                    severity = input_verdict.severity,
                    "Crisis indicators detected, returning supportive response"
                );
                return self.intervention_response();
            }
            Verdict::Approved => {}
        }

        let (sources, mut degraded) = self.retrieve_context(query).await;

        let request = self.build_request(query, &sources);

        let (content, backend_used) = match self.router.generate(&request).await {
            Ok(result) => {
                degraded = degraded || result.fallback_used;
                (result.content, Some(result.backend))
            }
            Err(error) => {
                warn!(
                    conversation_id = %query.conversation_id,
                    error = %error,
                    "Generation failed on all eligible backends"
                );
                return PipelineResponse {
                    content: FALLBACK_MESSAGE.to_string(),
                    backend_used: None,
                    blocked: false,
                    degraded: true,
                    sources,
                };
            }
        };

        let output_verdict = self.gate.moderate(&content).await;
        if !output_verdict.is_approved() {
            info!(
                conversation_id = %query.conversation_id,
                severity = output_verdict.severity,
                "Generated content failed output moderation"
            );
            return PipelineResponse::blocked(output_verdict.reason.as_deref());
        }

        PipelineResponse {
            content,
            backend_used,
            blocked: false,
            degraded,
            sources,
        }
    }

    /// Retrieval failure degrades the response instead of failing it
    async fn retrieve_context(&self, query: &Query) -> (Vec<RetrievedPassage>, bool) {
        match self.retriever.retrieve(&query.text, self.config.top_k).await {
            Ok(passages) => (passages, false),
            Err(error) => {
                warn!(
                    conversation_id = %query.conversation_id,
                    error = %error,
                    "Retrieval unavailable, continuing without context"
                );
                (Vec::new(), true)
            }
        }
    }

    fn build_request(&self, query: &Query, sources: &[RetrievedPassage]) -> GenerationRequest {
        let params = GenerationParams {
            max_tokens: query.max_tokens.unwrap_or(self.config.default_max_tokens),
            temperature: query.temperature.unwrap_or(self.config.default_temperature),
        };

        let depth = if params.max_tokens > DEEP_MAX_TOKENS
            || query.stress_level == StressLevel::Critical
        {
            Depth::Deep
        } else {
            Depth::Fast
        };

        GenerationRequest::new(self.build_prompt(query, sources))
            .with_attachments(query.attachments.clone())
            .with_params(params)
            .with_depth(depth)
    }

    fn build_prompt(&self, query: &Query, sources: &[RetrievedPassage]) -> String {
        let mut prompt = String::from(
            "You are a compassionate ethical companion. Ground your answer in the provided \
             context, acknowledge emotional weight where present, and never give medical, \
             legal, or financial advice.\n",
        );

        if !sources.is_empty() {
            prompt.push_str("\nContext:\n");
            for (i, passage) in sources.iter().enumerate() {
                prompt.push_str(&format!("{}. [{}] {}\n", i + 1, passage.source, passage.text));
            }
        }

        prompt.push_str(&format!(
            "\nThe person asking reports a {} stress level.\n\nQuestion: {}",
            query.stress_level.as_str(),
            query.text
        ));

        prompt
    }

    fn intervention_response(&self) -> PipelineResponse {
        let mut content = String::from(
            "It sounds like you're carrying something really heavy right now, and I'm glad \
             you reached out. You don't have to face this alone. Please consider talking to \
             someone who can support you directly:",
        );
        for resource in &self.config.crisis_resources {
            content.push_str("\n- ");
            content.push_str(resource);
        }

        PipelineResponse {
            content,
            backend_used: None,
            blocked: false,
            degraded: false,
            sources: Vec::new(),
        }
    }
}
