use std::fmt::Debug;

use async_trait::async_trait;

use super::Classification;
use crate::domain::DomainError;

/// Trait for content classifiers (keyword tables, external moderation APIs)
#[async_trait]
pub trait ContentClassifier: Send + Sync + Debug {
    /// Classify a text into a category with a severity score
    async fn classify(&self, text: &str) -> Result<Classification, DomainError>;

    /// Get the classifier name
    fn classifier_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted classifier for safety gate and pipeline tests
    #[derive(Debug)]
    pub struct MockClassifier {
        script: Mutex<Vec<Result<Classification, String>>>,
        default: Option<Classification>,
        calls: AtomicUsize,
    }

    impl MockClassifier {
        pub fn new() -> Self {
            Self {
                script: Mutex::new(Vec::new()),
                default: None,
                calls: AtomicUsize::new(0),
            }
        }

        /// Return this classification once the script is exhausted
        pub fn with_classification(mut self, classification: Classification) -> Self {
            self.default = Some(classification);
            self
        }

        /// Queue outcomes consumed in order, one per call
        pub fn with_script(self, outcomes: Vec<Result<Classification, String>>) -> Self {
            *self.script.lock().unwrap() = outcomes;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for MockClassifier {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ContentClassifier for MockClassifier {
        async fn classify(&self, _text: &str) -> Result<Classification, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let next = {
                let mut script = self.script.lock().unwrap();
                if script.is_empty() {
                    None
                } else {
                    Some(script.remove(0))
                }
            };

            match next {
                Some(Ok(classification)) => Ok(classification),
                Some(Err(cause)) => Err(DomainError::moderation_unavailable(cause)),
                None => self
                    .default
                    .clone()
                    .ok_or_else(|| DomainError::moderation_unavailable("no scripted outcome")),
            }
        }

        fn classifier_name(&self) -> &'static str {
            "mock"
        }
    }
}
