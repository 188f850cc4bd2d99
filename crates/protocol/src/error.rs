//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while parsing protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Field `{0}` must be an integer")]
    NotAnInteger(&'static str),

    #[error("Field `color` must be a non-empty string")]
    MissingColor,

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
