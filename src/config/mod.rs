pub mod app_config;

pub use app_config::{
    AppConfig, BackendConfig, CircuitSettings, ClassifierKind, EmbeddingSettings, LogFormat,
    LoggingConfig, ModerationSettings, PipelineSettings, ProviderKind, RetrievalSettings,
    RouterSettings, ServerConfig,
};
