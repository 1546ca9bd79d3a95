//! Shared application state injected into handlers

use std::sync::Arc;

use serde::Serialize;

use crate::domain::routing::HealthRegistry;
use crate::domain::ResponsePipeline;

/// Retrieval component status, reported by the readiness probe.
///
/// Captured at startup: an unconfigured embedder or an empty index means
/// every response will be served without source context.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RetrievalStatus {
    pub embedder_configured: bool,
    pub indexed_chunks: usize,
}

impl RetrievalStatus {
    pub fn is_ready(&self) -> bool {
        self.embedder_configured && self.indexed_chunks > 0
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResponsePipeline>,
    pub health_registry: Arc<HealthRegistry>,
    pub retrieval: RetrievalStatus,
}

impl AppState {
    pub fn new(
        pipeline: Arc<ResponsePipeline>,
        health_registry: Arc<HealthRegistry>,
        retrieval: RetrievalStatus,
    ) -> Self {
        Self {
            pipeline,
            health_registry,
            retrieval,
        }
    }
}
