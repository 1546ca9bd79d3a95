//! LLM backend adapters

pub mod anthropic;
pub mod factory;
pub mod gemini;
pub mod gemma;

pub use anthropic::AnthropicBackend;
pub use factory::LlmBackendFactory;
pub use gemini::GeminiBackend;
pub use gemma::GemmaBackend;
