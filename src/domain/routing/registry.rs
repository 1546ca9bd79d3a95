//! Injected, thread-safe registry of per-backend circuit state

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use super::health::{BackendHealth, CircuitBreakerConfig, CircuitState};
use super::BackendId;

/// Permission for one generation attempt against a backend.
///
/// The caller must report the outcome through `record_success` or
/// `record_failure`. Dropping the permit without an outcome (the attempt
/// future was cancelled) gives the half-open trial slot back, so a client
/// disconnect cannot wedge a recovering circuit in half-open.
#[derive(Debug)]
#[must_use = "an unreported attempt holds the trial slot until dropped"]
pub struct AttemptPermit<'a> {
    registry: &'a HealthRegistry,
    id: BackendId,
    outcome_recorded: bool,
}

impl AttemptPermit<'_> {
    pub fn record_success(mut self) {
        self.outcome_recorded = true;
        self.registry.record_success(&self.id);
    }

    pub fn record_failure(mut self) {
        self.outcome_recorded = true;
        self.registry.record_failure(&self.id);
    }
}

impl Drop for AttemptPermit<'_> {
    fn drop(&mut self) {
        if !self.outcome_recorded {
            self.registry.release_attempt(&self.id);
        }
    }
}

/// Snapshot of one backend's health, for readiness reporting
#[derive(Debug, Clone, Serialize)]
pub struct BackendHealthSnapshot {
    pub backend: BackendId,
    pub state: CircuitState,
    pub consecutive_failures: u32,
}

/// Process-wide registry of backend health.
///
/// Constructed once at startup and injected into the router; tests
/// substitute a fresh registry. The mutex serializes concurrent outcome
/// reports so no update is lost.
#[derive(Debug)]
pub struct HealthRegistry {
    config: CircuitBreakerConfig,
    states: Mutex<HashMap<BackendId, BackendHealth>>,
}

impl HealthRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            states: Mutex::new(HashMap::new()),
        }
    }

    // Health records are plain counters; a panic elsewhere in the process
    // must not make them unreadable.
    fn states(&self) -> MutexGuard<'_, HashMap<BackendId, BackendHealth>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn register(&self, id: BackendId) {
        self.states().entry(id).or_insert_with(BackendHealth::new);
    }

    /// Whether the backend's circuit would currently permit a call
    pub fn is_callable(&self, id: &BackendId) -> bool {
        self.states()
            .get(id)
            .map(|h| h.is_callable(&self.config))
            .unwrap_or(false)
    }

    /// Acquire permission for one call, consuming the half-open trial slot
    /// if the circuit is recovering. The permit must be resolved with an
    /// outcome; dropping it unresolved releases the slot.
    pub fn try_begin_attempt(&self, id: &BackendId) -> Option<AttemptPermit<'_>> {
        let granted = self
            .states()
            .get_mut(id)
            .map(|h| h.try_begin_attempt(&self.config))
            .unwrap_or(false);

        granted.then(|| AttemptPermit {
            registry: self,
            id: id.clone(),
            outcome_recorded: false,
        })
    }

    fn release_attempt(&self, id: &BackendId) {
        if let Some(health) = self.states().get_mut(id) {
            health.release_trial();
        }
    }

    pub fn record_success(&self, id: &BackendId) {
        if let Some(health) = self.states().get_mut(id) {
            health.record_success();
        }
    }

    pub fn record_failure(&self, id: &BackendId) {
        if let Some(health) = self.states().get_mut(id) {
            health.record_failure(&self.config);
        }
    }

    pub fn state(&self, id: &BackendId) -> Option<CircuitState> {
        self.states().get(id).map(|h| h.state())
    }

    pub fn consecutive_failures(&self, id: &BackendId) -> u32 {
        self.states()
            .get(id)
            .map(|h| h.consecutive_failures())
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> Vec<BackendHealthSnapshot> {
        let states = self.states();
        let mut snapshots: Vec<_> = states
            .iter()
            .map(|(id, health)| BackendHealthSnapshot {
                backend: id.clone(),
                state: health.state(),
                consecutive_failures: health.consecutive_failures(),
            })
            .collect();
        snapshots.sort_by(|a, b| a.backend.as_str().cmp(b.backend.as_str()));
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn registry(threshold: u32) -> HealthRegistry {
        HealthRegistry::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            cooldown: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_unregistered_backend_is_not_callable() {
        let registry = registry(3);
        assert!(!registry.is_callable(&BackendId::new("ghost")));
    }

    #[test]
    fn test_failures_open_circuit_per_backend() {
        let registry = registry(2);
        let a = BackendId::new("a");
        let b = BackendId::new("b");
        registry.register(a.clone());
        registry.register(b.clone());

        registry.record_failure(&a);
        registry.record_failure(&a);

        assert_eq!(registry.state(&a), Some(CircuitState::Open));
        assert_eq!(registry.state(&b), Some(CircuitState::Closed));
        assert!(!registry.is_callable(&a));
        assert!(registry.is_callable(&b));
    }

    #[test]
    fn test_dropped_permit_releases_half_open_trial_slot() {
        let registry = HealthRegistry::new(CircuitBreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::ZERO,
        });
        let id = BackendId::new("recovering");
        registry.register(id.clone());

        registry.record_failure(&id);
        assert_eq!(registry.state(&id), Some(CircuitState::Open));

        // Cooldown elapsed: the first permit takes the single trial slot
        let permit = registry.try_begin_attempt(&id).unwrap();
        assert!(registry.try_begin_attempt(&id).is_none());

        // Cancelled attempt: dropped without an outcome
        drop(permit);

        assert_eq!(registry.state(&id), Some(CircuitState::HalfOpen));
        assert!(registry.is_callable(&id));
        assert!(registry.try_begin_attempt(&id).is_some());
    }

    #[test]
    fn test_permit_outcomes_drive_circuit_transitions() {
        let registry = HealthRegistry::new(CircuitBreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::ZERO,
        });
        let id = BackendId::new("flaky");
        registry.register(id.clone());
        registry.record_failure(&id);

        let permit = registry.try_begin_attempt(&id).unwrap();
        permit.record_failure();
        assert_eq!(registry.state(&id), Some(CircuitState::Open));

        let permit = registry.try_begin_attempt(&id).unwrap();
        permit.record_success();
        assert_eq!(registry.state(&id), Some(CircuitState::Closed));
        assert_eq!(registry.consecutive_failures(&id), 0);
    }

    #[test]
    fn test_snapshot_is_sorted_by_backend() {
        let registry = registry(3);
        registry.register(BackendId::new("zeta"));
        registry.register(BackendId::new("alpha"));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot[0].backend.as_str(), "alpha");
        assert_eq!(snapshot[1].backend.as_str(), "zeta");
    }
}
