//! Backend identity, health tracking and routing

pub mod health;
pub mod registry;
pub mod router;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use health::{CircuitBreakerConfig, CircuitState};
pub use registry::{AttemptPermit, BackendHealthSnapshot, HealthRegistry};
pub use router::{BackendCapabilities, BackendOptions, ModelRouter, Requirements, RouterConfig, SpeedTier};

/// Stable identifier of a configured backend (e.g. "gemini-flash")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(String);

impl BackendId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
