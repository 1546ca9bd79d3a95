//! Content classifier implementations

pub mod http_api;
pub mod keyword;

pub use http_api::HttpClassifier;
pub use keyword::KeywordClassifier;
