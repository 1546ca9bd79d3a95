use std::fmt::Debug;

use async_trait::async_trait;

use super::RetrievedPassage;
use crate::domain::DomainError;

/// Trait for knowledge retrievers backed by a vector index
#[async_trait]
pub trait KnowledgeRetriever: Send + Sync + Debug {
    /// Return up to `k` passages ordered by descending relevance.
    ///
    /// Fails with `RetrievalUnavailable` when the index is unreachable;
    /// callers treat that as non-fatal.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed-result retriever for pipeline tests
    #[derive(Debug)]
    pub struct MockRetriever {
        passages: Vec<RetrievedPassage>,
        unavailable: bool,
        calls: AtomicUsize,
    }

    impl MockRetriever {
        pub fn new() -> Self {
            Self {
                passages: Vec::new(),
                unavailable: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_passages(mut self, passages: Vec<RetrievedPassage>) -> Self {
            self.passages = passages;
            self
        }

        /// Make every call fail with `RetrievalUnavailable`
        pub fn unavailable() -> Self {
            Self {
                passages: Vec::new(),
                unavailable: true,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for MockRetriever {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl KnowledgeRetriever for MockRetriever {
        async fn retrieve(
            &self,
            _query: &str,
            k: usize,
        ) -> Result<Vec<RetrievedPassage>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.unavailable {
                return Err(DomainError::retrieval_unavailable("mock index offline"));
            }

            Ok(self.passages.iter().take(k).cloned().collect())
        }
    }
}
