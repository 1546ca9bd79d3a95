use thiserror::Error;

/// A single failed generation attempt, kept for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub backend: String,
    pub cause: String,
}

impl AttemptFailure {
    pub fn new(backend: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            cause: cause.into(),
        }
    }
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.backend, self.cause)
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Retrieval unavailable: {message}")]
    RetrievalUnavailable { message: String },

    #[error("Moderation unavailable: {message}")]
    ModerationUnavailable { message: String },

    #[error("Backend '{backend}' timed out after {timeout_ms}ms")]
    BackendTimeout { backend: String, timeout_ms: u64 },

    #[error("Backend '{backend}' transport error: {message}")]
    BackendTransport { backend: String, message: String },

    #[error("All eligible backends are unavailable")]
    AllBackendsUnavailable,

    #[error("Generation failed after {} attempt(s): {}", attempts.len(), format_attempts(attempts))]
    GenerationFailed { attempts: Vec<AttemptFailure> },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn format_attempts(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    pub fn retrieval_unavailable(message: impl Into<String>) -> Self {
        Self::RetrievalUnavailable {
            message: message.into(),
        }
    }

    pub fn moderation_unavailable(message: impl Into<String>) -> Self {
        Self::ModerationUnavailable {
            message: message.into(),
        }
    }

    pub fn backend_timeout(backend: impl Into<String>, timeout_ms: u64) -> Self {
        Self::BackendTimeout {
            backend: backend.into(),
            timeout_ms,
        }
    }

    pub fn backend_transport(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendTransport {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn generation_failed(attempts: Vec<AttemptFailure>) -> Self {
        Self::GenerationFailed { attempts }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
