use serde::Deserialize;

use crate::domain::routing::SpeedTier;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
    #[serde(default)]
    pub router: RouterSettings,
    #[serde(default)]
    pub circuit: CircuitSettings,
    #[serde(default)]
    pub moderation: ModerationSettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which adapter a configured backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Anthropic,
    Gemma,
}

/// One backend entry; list order is the routing priority
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub id: String,
    pub provider: ProviderKind,
    /// Model name for hosted providers; unused for self-hosted Gemma
    pub model: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub multimodal: bool,
    #[serde(default = "default_tier")]
    pub tier: SpeedTier,
    /// Overrides the tier-derived call timeout
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_tier() -> SpeedTier {
    SpeedTier::Fast
}

fn default_max_concurrency() -> usize {
    8
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterSettings {
    pub max_attempts: usize,
    pub fast_timeout_secs: u64,
    pub deep_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircuitSettings {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Built-in keyword and pattern tables
    #[default]
    Keyword,
    /// External moderation endpoint
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationSettings {
    #[serde(default)]
    pub classifier: ClassifierKind,
    /// Required when `classifier = "http"`
    pub endpoint: Option<String>,
    pub block_threshold: f32,
    pub intervention_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalSettings {
    pub top_k: usize,
    /// Directory of markdown/text files ingested at startup
    pub corpus_dir: Option<String>,
    pub embedding: EmbeddingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    pub model: String,
    pub api_key_env: String,
    pub dimensions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    pub default_max_tokens: u32,
    pub default_temperature: f32,
    #[serde(default)]
    pub crisis_resources: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            backends: Vec::new(),
            router: RouterSettings::default(),
            circuit: CircuitSettings::default(),
            moderation: ModerationSettings::default(),
            retrieval: RetrievalSettings::default(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            fast_timeout_secs: 10,
            deep_timeout_secs: 20,
        }
    }
}

impl Default for CircuitSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 30,
        }
    }
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::default(),
            endpoint: None,
            block_threshold: 0.8,
            intervention_threshold: 0.4,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            corpus_dir: None,
            embedding: EmbeddingSettings::default(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            dimensions: 768,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_max_tokens: 1000,
            default_temperature: 0.7,
            crisis_resources: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
