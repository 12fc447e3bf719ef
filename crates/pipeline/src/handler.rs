//! Upload handler seam
//!
//! [`UploadRequest`] is the slice of an HTTP request the pipeline cares
//! about, decoupled from any particular server so tests can construct one
//! directly. [`UploadHandler`] is the object-safe trait the hot swap and
//! the CORS shim wrap; [`Pipeline`](crate::Pipeline) implements it.

use std::future::Future;
use std::pin::Pin;

use axum::http::{header, HeaderMap, Method, Uri};
use axum::response::Response;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

/// One report upload as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub method: Method,
    /// URL on which the upload arrived; becomes the batch `collector_url`.
    pub uri: Uri,
    /// Value of the `Content-Type` header.
    pub content_type: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Remote peer as `host:port`; ingress strips the port.
    pub remote_addr: String,
    pub body: Bytes,
    /// Request context, threaded through the queue into every processor.
    pub cancel: CancellationToken,
}

impl UploadRequest {
    /// A POST upload with the Reporting content type already set.
    pub fn post(uri: Uri, remote_addr: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            uri,
            content_type: nel_report::REPORT_CONTENT_TYPE.to_string(),
            user_agent: String::new(),
            remote_addr: remote_addr.into(),
            body: body.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Build a request from the pieces an HTTP server extracts.
    pub fn from_parts(
        method: Method,
        uri: Uri,
        headers: &HeaderMap,
        remote_addr: impl Into<String>,
        body: Bytes,
    ) -> Self {
        let header_value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        Self {
            method,
            uri,
            content_type: header_value(header::CONTENT_TYPE),
            user_agent: header_value(header::USER_AGENT),
            remote_addr: remote_addr.into(),
            body,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// An upload request handler.
///
/// Implementors must be `Send + Sync`; the same handler serves every
/// request task concurrently. `close` is called once when the handler is
/// retired (shutdown, or being swapped out) and should quiesce whatever
/// the handler owns.
pub trait UploadHandler: Send + Sync {
    /// Handle one request, producing the HTTP response for it.
    fn handle<'a>(
        &'a self,
        request: UploadRequest,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

    /// Release resources held by this handler. Default is a no-op.
    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async {})
    }
}
