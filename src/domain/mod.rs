//! Domain layer: core types, contracts, and the response pipeline

pub mod error;
pub mod generation;
pub mod moderation;
pub mod pipeline;
pub mod query;
pub mod retrieval;
pub mod routing;

pub use error::{AttemptFailure, DomainError};
pub use pipeline::{PipelineConfig, PipelineResponse, ResponsePipeline};
pub use query::{Attachment, Query, StressLevel};
