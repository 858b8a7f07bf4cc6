//! The error type shared across the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Graph vertex not found: {0}")]
    GraphVertexNotFound(usize),
    #[error("Function has no entry block: {0}")]
    EntryBlockNotFound(String),
    #[error("Function not found: {0}")]
    FunctionNotFound(String),
    #[error("Value not found: {0}")]
    ValueNotFound(usize),
    #[error("Failed to resolve call at {call_site}: {reason}")]
    Resolution { call_site: String, reason: String },
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Error {
        Error::Custom(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
