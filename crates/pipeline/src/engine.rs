//! Pipeline engine - ingress, bounded queue, worker pool
//!
//! Ingress validates the request, stamps the batch with server-side
//! context, decodes the payload, and hands the batch to a bounded MPMC
//! queue. Long-lived worker tasks drain the queue and run the processor
//! chain over each batch. Enqueueing never blocks: when the queue is full
//! the batch is dropped and counted.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use crossfire::{MAsyncRx, MAsyncTx, TrySendError};
use nel_processor::Chain;
use nel_report::{decode_reports, ReportBatch, REPORT_CONTENT_TYPE};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::error::IngestError;
use crate::handler::{UploadHandler, UploadRequest};
use crate::metrics::PipelineMetrics;
use crate::{DEFAULT_QUEUE_SIZE, DEFAULT_WORKER_COUNT};

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;

/// Sizing knobs for a pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Capacity of the batch queue.
    pub queue_size: usize,
    /// Number of worker tasks. Zero is allowed (nothing drains the
    /// queue); tests use it to exercise backpressure.
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            workers: DEFAULT_WORKER_COUNT,
        }
    }
}

/// What ingress did with a decoded batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Queued for processing.
    Enqueued,
    /// Queue was full; the batch is gone. The client still sees 204 - the
    /// protocol has no way to signal the drop.
    Dropped,
}

/// A batch waiting in the queue, paired with its request context.
struct QueuedBatch {
    cancel: CancellationToken,
    batch: ReportBatch,
}

/// The report-processing pipeline.
///
/// Build one per configuration; live reconfiguration constructs a new
/// `Pipeline` and swaps it behind [`HotSwap`](crate::HotSwap) rather than
/// mutating this one. The processor list is read-only for the lifetime of
/// the instance.
pub struct Pipeline {
    chain: Arc<Chain>,
    clock: Arc<dyn Clock>,
    queue: Mutex<Option<MAsyncTx<QueuedBatch>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    metrics: Arc<PipelineMetrics>,
    // Keeps the channel alive when `workers` is zero, so a full queue
    // reports Full rather than Disconnected.
    _drain: MAsyncRx<QueuedBatch>,
}

impl Pipeline {
    /// Create a pipeline and spawn its workers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: PipelineConfig, chain: Chain, clock: Arc<dyn Clock>) -> Self {
        let (tx, rx) = crossfire::mpmc::bounded_async::<QueuedBatch>(config.queue_size.max(1));
        let chain = Arc::new(chain);

        let mut workers = Vec::with_capacity(config.workers);
        for worker_id in 0..config.workers {
            let rx = rx.clone();
            let chain = Arc::clone(&chain);
            workers.push(tokio::spawn(async move {
                tracing::debug!(worker_id, "pipeline worker starting");
                while let Ok(mut item) = rx.recv().await {
                    chain.process(&item.cancel, &mut item.batch).await;
                }
                tracing::debug!(worker_id, "pipeline worker stopping");
            }));
        }

        tracing::info!(
            queue_size = config.queue_size,
            workers = config.workers,
            processors = ?chain.names(),
            "pipeline starting"
        );

        Self {
            chain,
            clock,
            queue: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            metrics: Arc::new(PipelineMetrics::new()),
            _drain: rx,
        }
    }

    /// Reference to this pipeline's metrics.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Take one upload request through validation, stamping, decoding,
    /// and the enqueue attempt.
    ///
    /// Protocol errors come back as `Err` and map to 4xx; a decodable
    /// upload always yields `Ok`, with [`IngestOutcome::Dropped`]
    /// distinguishing a full queue for metrics' sake.
    pub async fn ingest(&self, request: UploadRequest) -> Result<IngestOutcome, IngestError> {
        self.metrics.request_received();

        if request.method != Method::POST {
            self.metrics.protocol_error();
            return Err(IngestError::MethodNotAllowed);
        }

        if !media_type(&request.content_type).eq_ignore_ascii_case(REPORT_CONTENT_TYPE) {
            self.metrics.protocol_error();
            return Err(IngestError::UnsupportedContentType);
        }

        let remote: SocketAddr = request.remote_addr.parse().map_err(|_| {
            self.metrics.protocol_error();
            IngestError::RemoteAddr(request.remote_addr.clone())
        })?;

        let reports = decode_reports(&request.body).map_err(|error| {
            self.metrics.protocol_error();
            IngestError::Payload(error)
        })?;
        self.metrics.reports_decoded(reports.len() as u64);

        let batch = ReportBatch {
            time: self.clock.now(),
            collector_url: request.uri.to_string(),
            client_ip: remote.ip(),
            client_user_agent: request.user_agent,
            reports,
            ..ReportBatch::default()
        };

        let queue = self.queue.lock();
        let Some(tx) = queue.as_ref() else {
            tracing::error!("ingest called on a closed pipeline");
            return Err(IngestError::Closed);
        };
        match tx.try_send(QueuedBatch {
            cancel: request.cancel,
            batch,
        }) {
            Ok(()) => {
                self.metrics.batch_enqueued();
                Ok(IngestOutcome::Enqueued)
            }
            Err(TrySendError::Full(_)) => {
                self.metrics.batch_dropped();
                tracing::warn!("batch queue full, dropping upload");
                Ok(IngestOutcome::Dropped)
            }
            Err(TrySendError::Disconnected(_)) => Err(IngestError::Closed),
        }
    }

    /// Close the queue, wait for the workers to finish draining it, then
    /// close every processor. Idempotent.
    pub async fn close(&self) {
        let tx = self.queue.lock().take();
        drop(tx);

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(error) = worker.await {
                tracing::warn!(%error, "pipeline worker panicked");
            }
        }

        self.chain.close();

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            requests = snapshot.requests_received,
            enqueued = snapshot.batches_enqueued,
            dropped = snapshot.batches_dropped,
            "pipeline shut down"
        );
    }
}

impl UploadHandler for Pipeline {
    fn handle<'a>(
        &'a self,
        request: UploadRequest,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>> {
        Box::pin(async move {
            match self.ingest(request).await {
                // Dropped included: the queue state is not the client's
                // problem.
                Ok(_) => StatusCode::NO_CONTENT.into_response(),
                Err(error) => error.into_response(),
            }
        })
    }

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(Pipeline::close(self))
    }
}

/// Media type of a `Content-Type` value, parameters stripped.
fn media_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}
