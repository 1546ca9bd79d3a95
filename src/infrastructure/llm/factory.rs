//! Builds backend adapters from configuration entries

use std::sync::Arc;

use crate::config::{BackendConfig, ProviderKind};
use crate::domain::generation::LlmBackend;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClient;

use super::anthropic::AnthropicBackend;
use super::gemini::GeminiBackend;
use super::gemma::GemmaBackend;

pub struct LlmBackendFactory;

impl LlmBackendFactory {
    pub fn create(config: &BackendConfig) -> Result<Arc<dyn LlmBackend>, DomainError> {
        let client = HttpClient::new();

        match config.provider {
            ProviderKind::Gemini => {
                let api_key = require_api_key(config)?;
                let model = require_model(config)?;
                Ok(match config.base_url {
                    Some(ref url) => {
                        Arc::new(GeminiBackend::with_base_url(client, api_key, model, url))
                    }
                    None => Arc::new(GeminiBackend::new(client, api_key, model)),
                })
            }
            ProviderKind::Anthropic => {
                let api_key = require_api_key(config)?;
                let model = require_model(config)?;
                Ok(match config.base_url {
                    Some(ref url) => {
                        Arc::new(AnthropicBackend::with_base_url(client, api_key, model, url))
                    }
                    None => Arc::new(AnthropicBackend::new(client, api_key, model)),
                })
            }
            ProviderKind::Gemma => {
                // The gemma wire format has no image parts; a multimodal
                // flag here would route attachments into a silent drop.
                if config.multimodal {
                    return Err(DomainError::configuration(format!(
                        "Backend '{}': gemma provider does not support multimodal",
                        config.id
                    )));
                }

                let base_url = config.base_url.clone().ok_or_else(|| {
                    DomainError::configuration(format!(
                        "Backend '{}' requires base_url",
                        config.id
                    ))
                })?;

                let mut backend = GemmaBackend::new(client, base_url);
                if let Some(ref env) = config.api_key_env {
                    if let Ok(key) = std::env::var(env) {
                        backend = backend.with_api_key(key);
                    }
                }
                Ok(Arc::new(backend))
            }
        }
    }
}

fn require_api_key(config: &BackendConfig) -> Result<String, DomainError> {
    let env = config.api_key_env.as_ref().ok_or_else(|| {
        DomainError::configuration(format!("Backend '{}' requires api_key_env", config.id))
    })?;

    std::env::var(env).map_err(|_| {
        DomainError::configuration(format!(
            "Backend '{}': environment variable '{}' is not set",
            config.id, env
        ))
    })
}

fn require_model(config: &BackendConfig) -> Result<String, DomainError> {
    config.model.clone().ok_or_else(|| {
        DomainError::configuration(format!("Backend '{}' requires a model name", config.id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::routing::SpeedTier;

    fn backend_config(provider: ProviderKind) -> BackendConfig {
        BackendConfig {
            id: "test".to_string(),
            provider,
            model: Some("some-model".to_string()),
            api_key_env: None,
            base_url: None,
            multimodal: false,
            tier: SpeedTier::Fast,
            timeout_secs: None,
            max_concurrency: 8,
        }
    }

    #[test]
    fn test_hosted_provider_without_api_key_env_is_rejected() {
        let error = LlmBackendFactory::create(&backend_config(ProviderKind::Gemini)).unwrap_err();
        assert!(matches!(error, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_gemma_without_base_url_is_rejected() {
        let error = LlmBackendFactory::create(&backend_config(ProviderKind::Gemma)).unwrap_err();
        assert!(matches!(error, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_gemma_marked_multimodal_is_rejected() {
        let mut config = backend_config(ProviderKind::Gemma);
        config.base_url = Some("http://localhost:3000".to_string());
        config.multimodal = true;

        let error = LlmBackendFactory::create(&config).unwrap_err();
        assert!(matches!(error, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_gemma_with_base_url_is_created() {
        let mut config = backend_config(ProviderKind::Gemma);
        config.base_url = Some("http://localhost:3000".to_string());

        let backend = LlmBackendFactory::create(&config).unwrap();
        assert_eq!(backend.provider_name(), "gemma");
    }
}
