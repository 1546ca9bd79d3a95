//! Per-backend circuit breaker state

use std::time::{Duration, Instant};

use serde::Serialize;

/// Circuit breaker state for one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Healthy, calls allowed
    Closed,
    /// Calls short-circuited until the cooldown elapses
    Open,
    /// One trial call allowed
    HalfOpen,
}

/// Circuit breaker tuning
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// How long an open circuit waits before permitting a trial call
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Mutable health record for one backend.
///
/// Not thread-safe on its own; the registry serializes access.
#[derive(Debug)]
pub(crate) struct BackendHealth {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

impl BackendHealth {
    pub(crate) fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            trial_in_flight: false,
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Whether an attempt would currently be granted, without granting it
    pub(crate) fn is_callable(&self, config: &CircuitBreakerConfig) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => !self.trial_in_flight,
            CircuitState::Open => self.cooldown_elapsed(config),
        }
    }

    /// Try to acquire permission for one call.
    ///
    /// An open circuit whose cooldown has elapsed transitions to half-open
    /// and grants exactly one trial slot.
    pub(crate) fn try_begin_attempt(&mut self, config: &CircuitBreakerConfig) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => {
                if self.trial_in_flight {
                    false
                } else {
                    self.trial_in_flight = true;
                    true
                }
            }
            CircuitState::Open => {
                if self.cooldown_elapsed(config) {
                    self.state = CircuitState::HalfOpen;
                    self.trial_in_flight = true;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Give back an attempt slot whose outcome was never reported.
    ///
    /// Clears the half-open trial flag so a cancelled trial call does not
    /// hold the circuit in half-open forever.
    pub(crate) fn release_trial(&mut self) {
        self.trial_in_flight = false;
    }

    pub(crate) fn record_success(&mut self) {
        self.state = CircuitState::Closed;
        self.consecutive_failures = 0;
        self.opened_at = None;
        self.trial_in_flight = false;
    }

    pub(crate) fn record_failure(&mut self, config: &CircuitBreakerConfig) {
        if self.state == CircuitState::HalfOpen {
            // Failed trial call reopens the circuit and resets the cooldown clock
            self.state = CircuitState::Open;
            self.opened_at = Some(Instant::now());
            self.trial_in_flight = false;
            self.consecutive_failures += 1;
            return;
        }

        self.consecutive_failures += 1;
        if self.consecutive_failures >= config.failure_threshold {
            self.state = CircuitState::Open;
            self.opened_at = Some(Instant::now());
        }
    }

    fn cooldown_elapsed(&self, config: &CircuitBreakerConfig) -> bool {
        self.opened_at
            .map(|at| at.elapsed() >= config.cooldown)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: u32, cooldown_ms: u64) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: threshold,
            cooldown: Duration::from_millis(cooldown_ms),
        }
    }

    #[test]
    fn test_opens_after_exactly_threshold_failures() {
        let cfg = config(3, 60_000);
        let mut health = BackendHealth::new();

        health.record_failure(&cfg);
        health.record_failure(&cfg);
        assert_eq!(health.state(), CircuitState::Closed);

        health.record_failure(&cfg);
        assert_eq!(health.state(), CircuitState::Open);
        assert_eq!(health.consecutive_failures(), 3);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cfg = config(3, 60_000);
        let mut health = BackendHealth::new();

        health.record_failure(&cfg);
        health.record_failure(&cfg);
        health.record_success();
        assert_eq!(health.consecutive_failures(), 0);

        health.record_failure(&cfg);
        health.record_failure(&cfg);
        assert_eq!(health.state(), CircuitState::Closed);
    }

    #[test]
    fn test_open_denies_attempts_until_cooldown() {
        let cfg = config(1, 60_000);
        let mut health = BackendHealth::new();

        health.record_failure(&cfg);
        assert_eq!(health.state(), CircuitState::Open);
        assert!(!health.try_begin_attempt(&cfg));
    }

    #[test]
    fn test_cooldown_grants_exactly_one_trial() {
        let cfg = config(1, 0);
        let mut health = BackendHealth::new();

        health.record_failure(&cfg);
        assert_eq!(health.state(), CircuitState::Open);

        // Cooldown of zero: first attempt transitions to half-open
        assert!(health.try_begin_attempt(&cfg));
        assert_eq!(health.state(), CircuitState::HalfOpen);

        // Second concurrent attempt is denied while the trial is in flight
        assert!(!health.try_begin_attempt(&cfg));
    }

    #[test]
    fn test_released_trial_slot_can_be_reacquired() {
        let cfg = config(1, 0);
        let mut health = BackendHealth::new();

        health.record_failure(&cfg);
        assert!(health.try_begin_attempt(&cfg));
        assert!(!health.try_begin_attempt(&cfg));

        health.release_trial();

        assert_eq!(health.state(), CircuitState::HalfOpen);
        assert!(health.is_callable(&cfg));
        assert!(health.try_begin_attempt(&cfg));
    }

    #[test]
    fn test_trial_success_closes_circuit() {
        let cfg = config(1, 0);
        let mut health = BackendHealth::new();

        health.record_failure(&cfg);
        assert!(health.try_begin_attempt(&cfg));
        health.record_success();

        assert_eq!(health.state(), CircuitState::Closed);
        assert!(health.try_begin_attempt(&cfg));
    }

    #[test]
    fn test_trial_failure_reopens_circuit() {
        let cfg = config(1, 60_000);
        let mut health = BackendHealth::new();

        health.record_failure(&cfg);
        // Force the trial by using a zero-cooldown view of the same record
        let zero = config(1, 0);
        assert!(health.try_begin_attempt(&zero));
        assert_eq!(health.state(), CircuitState::HalfOpen);

        health.record_failure(&cfg);
        assert_eq!(health.state(), CircuitState::Open);
        assert!(!health.try_begin_attempt(&cfg));
    }
}
