use serde::{Deserialize, Serialize};

/// Three-valued moderation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    NeedsIntervention,
    Blocked,
}

/// Category a classifier assigns to a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationCategory {
    Crisis,
    Toxicity,
    OffTopic,
    Benign,
}

/// Raw classifier output: one category plus a severity in [0, 1]
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: ModerationCategory,
    pub severity: f32,
    pub detail: Option<String>,
}

impl Classification {
    pub fn new(category: ModerationCategory, severity: f32) -> Self {
        Self {
            category,
            severity: severity.clamp(0.0, 1.0),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn benign() -> Self {
        Self::new(ModerationCategory::Benign, 0.0)
    }
}

/// Verdict produced by the safety gate for one text, never mutated
#[derive(Debug, Clone)]
pub struct ModerationVerdict {
    pub verdict: Verdict,
    pub reason: Option<String>,
    pub severity: f32,
}

impl ModerationVerdict {
    pub fn approved(severity: f32) -> Self {
        Self {
            verdict: Verdict::Approved,
            reason: None,
            severity: severity.clamp(0.0, 1.0),
        }
    }

    pub fn needs_intervention(reason: impl Into<String>, severity: f32) -> Self {
        Self {
            verdict: Verdict::NeedsIntervention,
            reason: Some(reason.into()),
            severity: severity.clamp(0.0, 1.0),
        }
    }

    pub fn blocked(reason: impl Into<String>, severity: f32) -> Self {
        Self {
            verdict: Verdict::Blocked,
            reason: Some(reason.into()),
            severity: severity.clamp(0.0, 1.0),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.verdict == Verdict::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_is_clamped() {
        let classification = Classification::new(ModerationCategory::Toxicity, 1.7);
        assert_eq!(classification.severity, 1.0);

        let verdict = ModerationVerdict::blocked("toxic", -0.2);
        assert_eq!(verdict.severity, 0.0);
    }

    #[test]
    fn test_verdict_serialization() {
        assert_eq!(
            serde_json::to_string(&Verdict::NeedsIntervention).unwrap(),
            "\"needs_intervention\""
        );
    }
}
