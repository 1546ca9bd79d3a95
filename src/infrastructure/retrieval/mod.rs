//! Retrieval infrastructure: embeddings, ingestion, and the vector index

pub mod gemini_embedding;
pub mod in_memory;
pub mod ingest;

pub use gemini_embedding::GeminiEmbedding;
pub use in_memory::InMemoryVectorIndex;
pub use ingest::{chunk_text, load_corpus, DocumentChunk};
