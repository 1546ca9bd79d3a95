//! Built-in classifier backed by keyword and pattern tables.
//!
//! Always available, so moderation keeps working when no external
//! moderation endpoint is configured.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::moderation::{Classification, ContentClassifier, ModerationCategory};
use crate::domain::DomainError;

const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "can't go on",
    "self harm",
    "hurt myself",
    "cutting",
    "overdose",
    "desperate",
    "hopeless",
];

static CRISIS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bi want to (die|kill myself|end it all)\b",
        r"\bi can't (take it|go on|handle this) anymore\b",
        r"\bno one would miss me\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid crisis pattern"))
    .collect()
});

static TOXIC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(hate|stupid|idiot|moron|dumb)\b.*\b(people|person|you)\b",
        r"\b(kill|hurt|harm)\b.*\b(others|someone|people)\b",
        r"\bfuck (you|off|this)\b",
        r"\b(racist|sexist|homophobic)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid toxicity pattern"))
    .collect()
});

static OFF_TOPIC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(invest|stock|crypto|bitcoin|trading|financial advice)\b",
        r"\b(diagnose|treatment|medication|prescription)\b",
        r"\b(lawyer|court|lawsuit|sue)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid off-topic pattern"))
    .collect()
});

/// Severity assigned when a crisis keyword or pattern matches; sits in
/// the intervention band, not the block band, so the person is routed to
/// support resources instead of being shut out.
const CRISIS_SEVERITY: f32 = 0.6;
const TOXICITY_SEVERITY: f32 = 0.85;
const OFF_TOPIC_SEVERITY: f32 = 0.2;

#[derive(Debug, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn classify_text(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();

        if TOXIC_PATTERNS.iter().any(|p| p.is_match(&lower)) {
            return Classification::new(ModerationCategory::Toxicity, TOXICITY_SEVERITY)
                .with_detail("Harmful language detected");
        }

        let crisis_hit = CRISIS_KEYWORDS.iter().any(|k| lower.contains(k))
            || CRISIS_PATTERNS.iter().any(|p| p.is_match(&lower));
        if crisis_hit {
            return Classification::new(ModerationCategory::Crisis, CRISIS_SEVERITY)
                .with_detail("Crisis indicators detected");
        }

        if OFF_TOPIC_PATTERNS.iter().any(|p| p.is_match(&lower)) {
            return Classification::new(ModerationCategory::OffTopic, OFF_TOPIC_SEVERITY)
                .with_detail("Outside the ethical guidance scope");
        }

        Classification::benign()
    }
}

#[async_trait]
impl ContentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, DomainError> {
        Ok(self.classify_text(text))
    }

    fn classifier_name(&self) -> &'static str {
        "keyword"
    }
}
