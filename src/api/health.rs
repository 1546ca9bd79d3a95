//! Health check endpoints for Kubernetes probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;
use crate::domain::routing::{BackendHealthSnapshot, CircuitState};

use super::state::{AppState, RetrievalStatus};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Readiness response with per-component checks
#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: HealthStatus,
    pub version: String,
    pub backends: Vec<BackendHealthSnapshot>,
    pub retrieval: RetrievalStatus,
}

/// Simple health check - returns 200 if the service is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check reporting backend circuit state and retrieval status.
///
/// Degraded while some circuits are open or retrieval cannot supply
/// context; unhealthy only when every configured backend is open.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let backends = state.health_registry.snapshot();
    let status = readiness(&backends, &state.retrieval);

    let status_code = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = ReadyResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        backends,
        retrieval: state.retrieval,
    };

    (status_code, Json(response))
}

fn readiness(backends: &[BackendHealthSnapshot], retrieval: &RetrievalStatus) -> HealthStatus {
    let open_count = backends
        .iter()
        .filter(|b| b.state == CircuitState::Open)
        .count();

    if backends.is_empty() || open_count == backends.len() {
        HealthStatus::Unhealthy
    } else if open_count > 0 || !retrieval.is_ready() {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Liveness check for Kubernetes liveness probes
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }

    #[test]
    fn test_ready_response_serialization() {
        let response = ReadyResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            backends: Vec::new(),
            retrieval: RetrievalStatus {
                embedder_configured: true,
                indexed_chunks: 42,
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"indexed_chunks\":42"));
        assert!(json.contains("\"embedder_configured\":true"));
    }

    fn snapshot(backend: &str, state: CircuitState) -> BackendHealthSnapshot {
        BackendHealthSnapshot {
            backend: crate::domain::routing::BackendId::new(backend),
            state,
            consecutive_failures: 0,
        }
    }

    fn ready_retrieval() -> RetrievalStatus {
        RetrievalStatus {
            embedder_configured: true,
            indexed_chunks: 10,
        }
    }

    #[test]
    fn test_readiness_healthy_with_closed_circuits_and_indexed_corpus() {
        let backends = vec![snapshot("a", CircuitState::Closed)];
        assert_eq!(readiness(&backends, &ready_retrieval()), HealthStatus::Healthy);
    }

    #[test]
    fn test_readiness_degrades_when_retrieval_cannot_serve_context() {
        let backends = vec![snapshot("a", CircuitState::Closed)];

        let no_embedder = RetrievalStatus {
            embedder_configured: false,
            indexed_chunks: 10,
        };
        assert_eq!(readiness(&backends, &no_embedder), HealthStatus::Degraded);

        let empty_index = RetrievalStatus {
            embedder_configured: true,
            indexed_chunks: 0,
        };
        assert_eq!(readiness(&backends, &empty_index), HealthStatus::Degraded);
    }

    #[test]
    fn test_readiness_unhealthy_only_when_all_circuits_open() {
        let some_open = vec![
            snapshot("a", CircuitState::Open),
            snapshot("b", CircuitState::Closed),
        ];
        assert_eq!(readiness(&some_open, &ready_retrieval()), HealthStatus::Degraded);

        let all_open = vec![snapshot("a", CircuitState::Open)];
        assert_eq!(readiness(&all_open, &ready_retrieval()), HealthStatus::Unhealthy);
        assert_eq!(readiness(&[], &ready_retrieval()), HealthStatus::Unhealthy);
    }
}
