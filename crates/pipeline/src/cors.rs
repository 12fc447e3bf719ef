//! CORS preflight shim
//!
//! Browsers preflight cross-origin report uploads with an OPTIONS
//! request. This wrapper answers those with a fixed allow-everything
//! response and passes every other method through to the wrapped handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::handler::{UploadHandler, UploadRequest};

#[cfg(test)]
#[path = "cors_test.rs"]
mod tests;

/// Handler wrapper that intercepts CORS preflight requests.
pub struct Cors {
    handler: Arc<dyn UploadHandler>,
}

impl Cors {
    /// Wrap a handler.
    pub fn new(handler: Arc<dyn UploadHandler>) -> Self {
        Self { handler }
    }
}

impl UploadHandler for Cors {
    fn handle<'a>(
        &'a self,
        request: UploadRequest,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>> {
        if request.method == Method::OPTIONS {
            Box::pin(async { preflight_response() })
        } else {
            self.handler.handle(request)
        }
    }

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.handler.close()
    }
}

fn preflight_response() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
    )
        .into_response()
}
