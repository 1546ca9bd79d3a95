//! Safety gate: maps classifier output onto the three-valued verdict

use std::sync::Arc;

use tracing::warn;

use super::{Classification, ContentClassifier, ModerationCategory, ModerationVerdict};

/// Threshold table for mapping severity onto verdicts
#[derive(Debug, Clone, Copy)]
pub struct ModerationThresholds {
    /// Severity at or above which any category is blocked
    pub block: f32,
    /// Severity at or above which a crisis category needs intervention
    pub intervention: f32,
}

impl Default for ModerationThresholds {
    fn default() -> Self {
        Self {
            block: 0.8,
            intervention: 0.4,
        }
    }
}

/// Wraps one classifier and applies the fixed threshold table.
///
/// Fails closed: when the classifier is unreachable the verdict is
/// NEEDS_INTERVENTION, never APPROVED.
#[derive(Debug, Clone)]
pub struct SafetyGate {
    classifier: Arc<dyn ContentClassifier>,
    thresholds: ModerationThresholds,
}

impl SafetyGate {
    pub fn new(classifier: Arc<dyn ContentClassifier>, thresholds: ModerationThresholds) -> Self {
        Self {
            classifier,
            thresholds,
        }
    }

    /// Moderate one text. Deterministic for identical classifier output.
    pub async fn moderate(&self, text: &str) -> ModerationVerdict {
        match self.classifier.classify(text).await {
            Ok(classification) => self.apply_thresholds(classification),
            Err(e) => {
                warn!(
                    classifier = self.classifier.classifier_name(),
                    error = %e,
                    "Classifier unreachable, failing closed"
                );
                ModerationVerdict::needs_intervention(
                    "Content review is temporarily unavailable",
                    self.thresholds.intervention,
                )
            }
        }
    }

    fn apply_thresholds(&self, classification: Classification) -> ModerationVerdict {
        let Classification {
            category,
            severity,
            detail,
        } = classification;

        let reason = detail.unwrap_or_else(|| default_reason(category).to_string());

        if severity >= self.thresholds.block {
            ModerationVerdict::blocked(reason, severity)
        } else if severity >= self.thresholds.intervention && category == ModerationCategory::Crisis
        {
            ModerationVerdict::needs_intervention(reason, severity)
        } else {
            ModerationVerdict::approved(severity)
        }
    }
}

fn default_reason(category: ModerationCategory) -> &'static str {
    match category {
        ModerationCategory::Crisis => "Crisis indicators detected",
        ModerationCategory::Toxicity => "Harmful language detected",
        ModerationCategory::OffTopic => "Outside the ethical guidance scope",
        ModerationCategory::Benign => "No concerns detected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::moderation::classifier::mock::MockClassifier;
    use crate::domain::moderation::Verdict;

    fn gate_with(classification: Classification) -> SafetyGate {
        SafetyGate::new(
            Arc::new(MockClassifier::new().with_classification(classification)),
            ModerationThresholds::default(),
        )
    }

    #[tokio::test]
    async fn test_high_severity_is_blocked_regardless_of_category() {
        let gate = gate_with(Classification::new(ModerationCategory::Toxicity, 0.9));
        let verdict = gate.moderate("some text").await;
        assert_eq!(verdict.verdict, Verdict::Blocked);
    }

    #[tokio::test]
    async fn test_mid_severity_crisis_needs_intervention() {
        let gate = gate_with(Classification::new(ModerationCategory::Crisis, 0.6));
        let verdict = gate.moderate("I feel hopeless").await;
        assert_eq!(verdict.verdict, Verdict::NeedsIntervention);
    }

    #[tokio::test]
    async fn test_mid_severity_non_crisis_is_approved() {
        let gate = gate_with(Classification::new(ModerationCategory::OffTopic, 0.6));
        let verdict = gate.moderate("what about crypto").await;
        assert_eq!(verdict.verdict, Verdict::Approved);
    }

    #[tokio::test]
    async fn test_boundary_severities() {
        // Exactly at the block threshold
        let verdict = gate_with(Classification::new(ModerationCategory::Benign, 0.8))
            .moderate("text")
            .await;
        assert_eq!(verdict.verdict, Verdict::Blocked);

        // Exactly at the intervention threshold, crisis category
        let verdict = gate_with(Classification::new(ModerationCategory::Crisis, 0.4))
            .moderate("text")
            .await;
        assert_eq!(verdict.verdict, Verdict::NeedsIntervention);

        // Just below the intervention threshold
        let verdict = gate_with(Classification::new(ModerationCategory::Crisis, 0.39))
            .moderate("text")
            .await;
        assert_eq!(verdict.verdict, Verdict::Approved);
    }

    #[tokio::test]
    async fn test_fails_closed_when_classifier_unreachable() {
        let gate = SafetyGate::new(
            Arc::new(MockClassifier::new().with_script(vec![Err("down".to_string())])),
            ModerationThresholds::default(),
        );

        let verdict = gate.moderate("anything").await;
        assert_eq!(verdict.verdict, Verdict::NeedsIntervention);
    }

    #[tokio::test]
    async fn test_deterministic_for_identical_input() {
        let gate = gate_with(Classification::new(ModerationCategory::Crisis, 0.55));

        let first = gate.moderate("same text").await;
        let second = gate.moderate("same text").await;

        assert_eq!(first.verdict, second.verdict);
        assert_eq!(first.severity, second.severity);
    }
}
