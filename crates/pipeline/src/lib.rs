//! NEL Collector - Pipeline
//!
//! The concurrent report-processing pipeline: HTTP ingress, a bounded
//! queue, and a worker pool that runs the processor chain over each
//! uploaded batch.
//!
//! # Architecture
//!
//! ```text
//! [Request] → Cors → HotSwap → Pipeline::ingest
//!                                 │ validate method / content type
//!                                 │ stamp time, client IP, UA, URL
//!                                 │ decode JSON array
//!                                 ▼
//!                        bounded MPMC queue ──→ worker 1 ─┐
//!                          (try_send, drops    → worker 2 ─┼─→ Chain
//!                           when full)         → worker N ─┘
//! ```
//!
//! # Key design
//!
//! - **Non-blocking ingress**: enqueue uses `try_send`; a full queue drops
//!   the batch (visible in metrics, invisible to the client, which has
//!   already earned its 204).
//! - **FIFO queue, unordered completion**: batches leave the queue in
//!   order, but two workers may finish in any order. Within a batch,
//!   processors run strictly in registration order.
//! - **Hot swap**: live reconfiguration builds a new `Pipeline` and swaps
//!   it behind [`HotSwap`]; in-flight requests finish against the handler
//!   they started with.
//! - **Injectable clock**: timestamps come from [`Clock`], read exactly
//!   once per batch at ingress.

mod clock;
mod cors;
mod engine;
mod error;
mod handler;
mod hotswap;
mod http;
mod metrics;

pub use clock::{Clock, SystemClock};
pub use cors::Cors;
pub use engine::{IngestOutcome, Pipeline, PipelineConfig};
pub use error::IngestError;
pub use handler::{UploadHandler, UploadRequest};
pub use hotswap::HotSwap;
pub use http::build_router;
pub use metrics::{MetricsSnapshot, PipelineMetrics};

/// Default capacity of the batch queue.
pub const DEFAULT_QUEUE_SIZE: usize = 1024;

/// Default number of worker tasks draining the queue.
pub const DEFAULT_WORKER_COUNT: usize = 10;
