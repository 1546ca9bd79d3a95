//! Infrastructure layer: adapters behind the domain contracts

pub mod http_client;
pub mod llm;
pub mod logging;
pub mod moderation;
pub mod retrieval;
