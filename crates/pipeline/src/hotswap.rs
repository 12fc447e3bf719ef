//! Hot swap - atomic handler replacement
//!
//! Wraps any [`UploadHandler`] so a new one can be installed mid-flight:
//! an external listener loads a new configuration, builds a new pipeline,
//! and calls [`HotSwap::swap`]. Requests hold the read half of a
//! readers/writer lock for the duration of dispatch, so they always finish
//! against the handler they started with, and no request ever observes a
//! half-installed handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::response::Response;
use tokio::sync::RwLock;

use crate::handler::{UploadHandler, UploadRequest};

#[cfg(test)]
#[path = "hotswap_test.rs"]
mod tests;

/// A request handler that can be atomically replaced.
pub struct HotSwap {
    handler: RwLock<Arc<dyn UploadHandler>>,
}

impl HotSwap {
    /// Wrap an initial handler.
    pub fn new(handler: Arc<dyn UploadHandler>) -> Self {
        Self {
            handler: RwLock::new(handler),
        }
    }

    /// Install a new handler for all future requests.
    ///
    /// Waits for in-flight requests to finish, closes the outgoing
    /// handler, then swaps. Requests that arrive while the swap is
    /// pending block until it completes.
    pub async fn swap(&self, new_handler: Arc<dyn UploadHandler>) {
        let mut guard = self.handler.write().await;
        guard.close().await;
        *guard = new_handler;
        tracing::info!("handler swapped");
    }

    /// Close the current handler, waiting for in-flight requests first.
    pub async fn close(&self) {
        let guard = self.handler.write().await;
        guard.close().await;
    }
}

impl UploadHandler for HotSwap {
    fn handle<'a>(
        &'a self,
        request: UploadRequest,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>> {
        Box::pin(async move {
            let guard = self.handler.read().await;
            guard.handle(request).await
        })
    }

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(HotSwap::close(self))
    }
}
