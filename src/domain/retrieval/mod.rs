//! Knowledge retrieval contracts

pub mod embedding;
pub mod passage;
pub mod retriever;

pub use embedding::EmbeddingProvider;
pub use passage::RetrievedPassage;
pub use retriever::KnowledgeRetriever;
