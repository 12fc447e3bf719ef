//! HTTP glue - the axum route for report uploads
//!
//! Binds the upload endpoint to an [`UploadHandler`]. Server bootstrap
//! (listener, TLS, signals) belongs to the binary; this module only turns
//! an axum request into an [`UploadRequest`] and back.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use axum::routing::any;
use axum::Router;

use crate::handler::{UploadHandler, UploadRequest};

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

/// Build a router exposing `/upload/` on the given handler.
///
/// Every method is dispatched to the handler; method filtering (POST
/// only, OPTIONS preflight) is the handler stack's job, so it behaves the
/// same under test as behind a server.
pub fn build_router(handler: Arc<dyn UploadHandler>) -> Router {
    Router::new()
        .route("/upload/", any(upload))
        .with_state(handler)
}

/// `/upload/` - hand the request to the current handler stack.
async fn upload(
    State(handler): State<Arc<dyn UploadHandler>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = UploadRequest::from_parts(method, uri, &headers, addr.to_string(), body);
    handler.handle(request).await
}
