//! Wire types for the HTTP API

pub mod ask;
pub mod error;
pub mod json;

pub use ask::{AskRequest, AskResponse, AttachmentPayload, SourceInfo};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
