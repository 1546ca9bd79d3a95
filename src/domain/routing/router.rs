//! Capability-aware backend selection with circuit breaking and fallback

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::registry::HealthRegistry;
use super::BackendId;
use crate::domain::error::AttemptFailure;
use crate::domain::generation::{Depth, GenerationRequest, GenerationResult, LlmBackend};
use crate::domain::DomainError;

/// Latency tier of a backend in the static capability table
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    Fast,
    Deep,
}

/// Static capability flags for one backend
#[derive(Debug, Clone, Copy)]
pub struct BackendCapabilities {
    pub multimodal: bool,
    pub tier: SpeedTier,
}

/// What a request needs from a backend
#[derive(Debug, Clone, Copy)]
pub struct Requirements {
    pub multimodal: bool,
    pub depth: Depth,
}

impl Requirements {
    fn preferred_tier(&self) -> SpeedTier {
        match self.depth {
            Depth::Fast => SpeedTier::Fast,
            Depth::Deep => SpeedTier::Deep,
        }
    }
}

/// Router-wide tuning
#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    /// Total attempts per logical request, across backends
    pub max_attempts: usize,
    pub fast_timeout: Duration,
    pub deep_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            fast_timeout: Duration::from_secs(10),
            deep_timeout: Duration::from_secs(20),
        }
    }
}

/// Per-backend registration options
#[derive(Debug, Clone, Copy)]
pub struct BackendOptions {
    /// Overrides the tier-derived timeout when set
    pub timeout: Option<Duration>,
    /// Concurrent outbound calls permitted, to respect vendor rate limits
    pub max_concurrency: usize,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            max_concurrency: 8,
        }
    }
}

#[derive(Debug)]
struct RegisteredBackend {
    id: BackendId,
    capabilities: BackendCapabilities,
    client: Arc<dyn LlmBackend>,
    timeout: Option<Duration>,
    limiter: Arc<Semaphore>,
}

/// Routes generation calls across configured backends.
///
/// Registration order is the static priority ranking; requirement fit
/// reorders within it.
#[derive(Debug)]
pub struct ModelRouter {
    backends: Vec<RegisteredBackend>,
    health: Arc<HealthRegistry>,
    config: RouterConfig,
}

impl ModelRouter {
    pub fn new(health: Arc<HealthRegistry>, config: RouterConfig) -> Self {
        Self {
            backends: Vec::new(),
            health,
            config,
        }
    }

    pub fn with_backend(
        mut self,
        id: BackendId,
        capabilities: BackendCapabilities,
        client: Arc<dyn LlmBackend>,
        options: BackendOptions,
    ) -> Self {
        self.health.register(id.clone());
        self.backends.push(RegisteredBackend {
            id,
            capabilities,
            client,
            timeout: options.timeout,
            limiter: Arc::new(Semaphore::new(options.max_concurrency.max(1))),
        });
        self
    }

    pub fn backend_ids(&self) -> Vec<BackendId> {
        self.backends.iter().map(|b| b.id.clone()).collect()
    }

    /// Pick the highest-ranked eligible backend whose circuit permits a call
    pub fn select(&self, requirements: Requirements) -> Result<BackendId, DomainError> {
        self.candidates(requirements)
            .into_iter()
            .find(|backend| self.health.is_callable(&backend.id))
            .map(|backend| backend.id.clone())
            .ok_or(DomainError::AllBackendsUnavailable)
    }

    /// Issue the generation call with bounded timeout and a single retry
    /// against the next-ranked eligible backend.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, DomainError> {
        let requirements = Requirements {
            multimodal: request.is_multimodal(),
            depth: request.depth,
        };

        let candidates = self.candidates(requirements);
        let top_ranked = candidates.first().map(|b| b.id.clone());

        let mut attempts: Vec<AttemptFailure> = Vec::new();

        for backend in candidates {
            if attempts.len() >= self.config.max_attempts {
                break;
            }

            let Some(permit) = self.health.try_begin_attempt(&backend.id) else {
                debug!(backend = %backend.id, "Circuit open, skipping backend");
                continue;
            };

            // If this future is dropped mid-attempt (client disconnect),
            // the unresolved permit releases the trial slot on drop.
            match self.attempt(backend, request, requirements).await {
                Ok(mut result) => {
                    permit.record_success();
                    result.fallback_used = top_ranked.as_ref() != Some(&backend.id);
                    info!(
                        backend = %result.backend,
                        latency_ms = result.latency.as_millis() as u64,
                        fallback = result.fallback_used,
                        "Generation succeeded"
                    );
                    return Ok(result);
                }
                Err(error) => {
                    permit.record_failure();
                    warn!(backend = %backend.id, error = %error, "Generation attempt failed");
                    attempts.push(AttemptFailure::new(backend.id.as_str(), error.to_string()));
                }
            }
        }

        if attempts.is_empty() {
            Err(DomainError::AllBackendsUnavailable)
        } else {
            Err(DomainError::generation_failed(attempts))
        }
    }

    async fn attempt(
        &self,
        backend: &RegisteredBackend,
        request: &GenerationRequest,
        requirements: Requirements,
    ) -> Result<GenerationResult, DomainError> {
        let _permit = backend
            .limiter
            .acquire()
            .await
            .map_err(|_| DomainError::internal("backend limiter closed"))?;

        let timeout = self.effective_timeout(backend, requirements);
        let started = Instant::now();

        // The timeout doubles as the cancellation point: dropping the call
        // future releases the underlying connection before the retry.
        match tokio::time::timeout(timeout, backend.client.complete(request)).await {
            Ok(Ok(content)) => Ok(GenerationResult {
                content,
                backend: backend.id.clone(),
                latency: started.elapsed(),
                fallback_used: false,
            }),
            Ok(Err(error)) => Err(error),
            Err(_) => Err(DomainError::backend_timeout(
                backend.id.as_str(),
                timeout.as_millis() as u64,
            )),
        }
    }

    /// Eligible backends ranked by requirement fit, then registration order
    fn candidates(&self, requirements: Requirements) -> Vec<&RegisteredBackend> {
        let eligible = self
            .backends
            .iter()
            .filter(|b| !requirements.multimodal || b.capabilities.multimodal);

        let preferred = requirements.preferred_tier();
        let (matching, rest): (Vec<_>, Vec<_>) =
            eligible.partition(|b| b.capabilities.tier == preferred);

        matching.into_iter().chain(rest).collect()
    }

    fn effective_timeout(
        &self,
        backend: &RegisteredBackend,
        requirements: Requirements,
    ) -> Duration {
        if let Some(timeout) = backend.timeout {
            return timeout;
        }

        if backend.capabilities.tier == SpeedTier::Deep || requirements.multimodal {
            self.config.deep_timeout
        } else {
            self.config.fast_timeout
        }
    }
}
