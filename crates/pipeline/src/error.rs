//! Ingress error types
//!
//! Protocol errors surface synchronously to the client as a 4xx status
//! with a short plain-text reason; nothing that errors here is ever
//! enqueued.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nel_report::{CodecError, REPORT_CONTENT_TYPE};
use thiserror::Error;

/// Errors from [`Pipeline::ingest`](crate::Pipeline::ingest)
#[derive(Debug, Error)]
pub enum IngestError {
    /// Upload attempted with a method other than POST
    #[error("Must use POST to upload reports")]
    MethodNotAllowed,

    /// Wrong `Content-Type` header
    #[error("Must use {REPORT_CONTENT_TYPE} to upload reports")]
    UnsupportedContentType,

    /// Remote address missing or not parseable as host:port
    #[error("invalid remote address `{0}`")]
    RemoteAddr(String),

    /// Upload body failed to decode
    #[error("{0}")]
    Payload(#[from] CodecError),

    /// Ingest called after the pipeline was closed; a programming error
    #[error("pipeline is closed")]
    Closed,
}

impl IngestError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedContentType | Self::RemoteAddr(_) | Self::Payload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Closed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
