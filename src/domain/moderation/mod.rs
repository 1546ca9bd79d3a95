//! Content moderation: classifier contract, verdicts, and the safety gate

pub mod classifier;
pub mod gate;
pub mod verdict;

pub use classifier::ContentClassifier;
pub use gate::{ModerationThresholds, SafetyGate};
pub use verdict::{Classification, ModerationCategory, ModerationVerdict, Verdict};
