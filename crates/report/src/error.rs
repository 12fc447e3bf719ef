//! Codec error types

use thiserror::Error;

/// Errors from decoding or emitting report JSON
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed JSON, non-array root, or wrong body shape
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
