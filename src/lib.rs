//! EthicCompanion response service
//!
//! A moderated, retrieval-augmented response pipeline over multiple LLM
//! backends, with capability-aware routing and per-backend circuit
//! breakers.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use api::state::{AppState, RetrievalStatus};
use config::ClassifierKind;
use domain::moderation::{ContentClassifier, ModerationThresholds, SafetyGate};
use domain::routing::{
    BackendCapabilities, BackendId, BackendOptions, CircuitBreakerConfig, HealthRegistry,
    ModelRouter, RouterConfig,
};
use domain::{PipelineConfig, ResponsePipeline};
use infrastructure::http_client::HttpClient;
use infrastructure::llm::LlmBackendFactory;
use infrastructure::moderation::{HttpClassifier, KeywordClassifier};
use infrastructure::retrieval::{load_corpus, GeminiEmbedding, InMemoryVectorIndex};
use tracing::{info, warn};

/// Create the application state with all components wired up
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let gate = create_safety_gate(config);
    let health_registry = Arc::new(HealthRegistry::new(CircuitBreakerConfig {
        failure_threshold: config.circuit.failure_threshold,
        cooldown: Duration::from_secs(config.circuit.cooldown_secs),
    }));

    let router = create_router(config, health_registry.clone())?;
    let (index, retrieval) = create_vector_index(config).await;

    let mut pipeline_config = PipelineConfig {
        top_k: config.retrieval.top_k,
        default_max_tokens: config.pipeline.default_max_tokens,
        default_temperature: config.pipeline.default_temperature,
        crisis_resources: config.pipeline.crisis_resources.clone(),
    };
    if pipeline_config.crisis_resources.is_empty() {
        pipeline_config.crisis_resources = PipelineConfig::default().crisis_resources;
    }

    let pipeline = Arc::new(ResponsePipeline::new(
        gate,
        index,
        Arc::new(router),
        pipeline_config,
    ));

    Ok(AppState::new(pipeline, health_registry, retrieval))
}

fn create_safety_gate(config: &AppConfig) -> SafetyGate {
    let classifier: Arc<dyn ContentClassifier> = match config.moderation.classifier {
        ClassifierKind::Keyword => Arc::new(KeywordClassifier::new()),
        ClassifierKind::Http => match config.moderation.endpoint {
            Some(ref endpoint) => Arc::new(HttpClassifier::new(HttpClient::new(), endpoint)),
            None => {
                warn!("Moderation endpoint not configured, using keyword classifier");
                Arc::new(KeywordClassifier::new())
            }
        },
    };

    info!(classifier = classifier.classifier_name(), "Safety gate ready");

    SafetyGate::new(
        classifier,
        ModerationThresholds {
            block: config.moderation.block_threshold,
            intervention: config.moderation.intervention_threshold,
        },
    )
}

fn create_router(
    config: &AppConfig,
    health_registry: Arc<HealthRegistry>,
) -> anyhow::Result<ModelRouter> {
    let mut router = ModelRouter::new(
        health_registry,
        RouterConfig {
            max_attempts: config.router.max_attempts,
            fast_timeout: Duration::from_secs(config.router.fast_timeout_secs),
            deep_timeout: Duration::from_secs(config.router.deep_timeout_secs),
        },
    );

    for backend_config in &config.backends {
        match LlmBackendFactory::create(backend_config) {
            Ok(client) => {
                info!(
                    backend = %backend_config.id,
                    provider = client.provider_name(),
                    multimodal = backend_config.multimodal,
                    "Backend registered"
                );
                router = router.with_backend(
                    BackendId::new(&backend_config.id),
                    BackendCapabilities {
                        multimodal: backend_config.multimodal,
                        tier: backend_config.tier,
                    },
                    client,
                    BackendOptions {
                        timeout: backend_config.timeout_secs.map(Duration::from_secs),
                        max_concurrency: backend_config.max_concurrency,
                    },
                );
            }
            Err(e) => {
                warn!(backend = %backend_config.id, error = %e, "Skipping backend");
            }
        }
    }

    if router.backend_ids().is_empty() {
        warn!("No backends registered; every query will get the fallback response");
    }

    Ok(router)
}

/// Build the vector index and ingest the corpus when one is configured.
///
/// Retrieval problems are never fatal here: an unreachable embedding API
/// or a missing corpus leaves the index empty and the pipeline degrades.
async fn create_vector_index(config: &AppConfig) -> (Arc<InMemoryVectorIndex>, RetrievalStatus) {
    let api_key = std::env::var(&config.retrieval.embedding.api_key_env).unwrap_or_else(|_| {
        warn!(
            env = %config.retrieval.embedding.api_key_env,
            "Embedding API key not set; retrieval will be unavailable"
        );
        String::new()
    });
    let embedder_configured = !api_key.is_empty();

    let embedder = Arc::new(GeminiEmbedding::new(
        HttpClient::new(),
        api_key,
        config.retrieval.embedding.model.clone(),
        config.retrieval.embedding.dimensions,
    ));
    let index = Arc::new(InMemoryVectorIndex::new(embedder));

    let mut indexed = 0;
    if let Some(ref dir) = config.retrieval.corpus_dir {
        match load_corpus(Path::new(dir)) {
            Ok(chunks) => match index.ingest(chunks).await {
                Ok(count) => indexed = count,
                Err(e) => warn!(error = %e, "Corpus ingestion failed, serving without context"),
            },
            Err(e) => warn!(error = %e, "Corpus directory unreadable, serving without context"),
        }
    }

    (
        index,
        RetrievalStatus {
            embedder_configured,
            indexed_chunks: indexed,
        },
    )
}
