//! Tests for the hot-swap handler

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use tokio::sync::Notify;
use tokio::time::{sleep, timeout};

use super::*;

/// Handler that answers with a fixed status and remembers being closed.
struct DummyHandler {
    status: StatusCode,
    closed: AtomicBool,
    served: AtomicUsize,
}

impl DummyHandler {
    fn new(status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            status,
            closed: AtomicBool::new(false),
            served: AtomicUsize::new(0),
        })
    }
}

impl UploadHandler for DummyHandler {
    fn handle<'a>(
        &'a self,
        _request: UploadRequest,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>> {
        Box::pin(async move {
            self.served.fetch_add(1, Ordering::SeqCst);
            self.status.into_response()
        })
    }

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            self.closed.store(true, Ordering::SeqCst);
        })
    }
}

/// Handler that blocks inside dispatch until released.
struct BlockingHandler {
    release: Arc<Notify>,
    status: StatusCode,
}

impl UploadHandler for BlockingHandler {
    fn handle<'a>(
        &'a self,
        _request: UploadRequest,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>> {
        Box::pin(async move {
            self.release.notified().await;
            self.status.into_response()
        })
    }
}

fn request() -> UploadRequest {
    UploadRequest::post(
        Uri::from_static("https://example.com/upload/"),
        "192.0.2.1:1234",
        &b"[]"[..],
    )
    .with_method(Method::GET)
}

#[tokio::test]
async fn test_swap_changes_which_handler_runs() {
    let ok_handler = DummyHandler::new(StatusCode::OK);
    let bad_request_handler = DummyHandler::new(StatusCode::BAD_REQUEST);

    let hotswap = HotSwap::new(ok_handler.clone());

    let response = hotswap.handle(request()).await;
    assert_eq!(response.status(), StatusCode::OK);

    hotswap.swap(bad_request_handler.clone()).await;

    let response = hotswap.handle(request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ok_handler.served.load(Ordering::SeqCst), 1);
    assert_eq!(bad_request_handler.served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_swap_closes_outgoing_handler() {
    let old = DummyHandler::new(StatusCode::OK);
    let new = DummyHandler::new(StatusCode::OK);

    let hotswap = HotSwap::new(old.clone());
    hotswap.swap(new.clone()).await;

    assert!(old.closed.load(Ordering::SeqCst));
    assert!(!new.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_close_closes_current_handler() {
    let handler = DummyHandler::new(StatusCode::OK);
    let hotswap = HotSwap::new(handler.clone());

    hotswap.close().await;
    assert!(handler.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_in_flight_request_finishes_against_old_handler() {
    let release = Arc::new(Notify::new());
    let blocking = Arc::new(BlockingHandler {
        release: Arc::clone(&release),
        status: StatusCode::OK,
    });
    let replacement = DummyHandler::new(StatusCode::BAD_REQUEST);

    let hotswap = Arc::new(HotSwap::new(blocking));

    // Start a request that parks inside the old handler.
    let in_flight = {
        let hotswap = Arc::clone(&hotswap);
        tokio::spawn(async move { hotswap.handle(request()).await })
    };
    sleep(Duration::from_millis(20)).await;

    // The swap has to wait for the read guard held by the request.
    let swap = {
        let hotswap = Arc::clone(&hotswap);
        let replacement = replacement.clone();
        tokio::spawn(async move { hotswap.swap(replacement).await })
    };
    sleep(Duration::from_millis(20)).await;
    assert!(!swap.is_finished(), "swap should wait for in-flight request");

    // Release the request; it must still see the old handler's response.
    release.notify_one();
    let response = timeout(Duration::from_secs(1), in_flight)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    timeout(Duration::from_secs(1), swap).await.unwrap().unwrap();

    // Requests after the swap see the new handler.
    let response = hotswap.handle(request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_every_request_lands_on_exactly_one_handler() {
    let first = DummyHandler::new(StatusCode::OK);
    let second = DummyHandler::new(StatusCode::BAD_REQUEST);
    let hotswap = Arc::new(HotSwap::new(first.clone()));

    let mut tasks = Vec::new();
    for index in 0..20 {
        if index == 10 {
            let hotswap = Arc::clone(&hotswap);
            let second = second.clone();
            tasks.push(tokio::spawn(async move {
                hotswap.swap(second).await;
                None
            }));
        } else {
            let hotswap = Arc::clone(&hotswap);
            tasks.push(tokio::spawn(async move {
                Some(hotswap.handle(request()).await.status())
            }));
        }
    }

    let mut dispatched = 0;
    for task in tasks {
        if let Some(status) = task.await.unwrap() {
            dispatched += 1;
            assert!(status == StatusCode::OK || status == StatusCode::BAD_REQUEST);
        }
    }

    // Old-handler dispatches plus new-handler dispatches cover every
    // request exactly once.
    let total = first.served.load(Ordering::SeqCst) + second.served.load(Ordering::SeqCst);
    assert_eq!(total, dispatched);
}
