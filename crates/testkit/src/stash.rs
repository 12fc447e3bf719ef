//! Stash processor

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use nel_processor::Processor;
use nel_report::ReportBatch;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Processor that keeps a copy of the last batch it saw.
///
/// Append it to the end of a chain to observe what the processors before
/// it produced. Clones share the same slot.
#[derive(Clone, Default)]
pub struct StashReports {
    dest: Arc<Mutex<Option<ReportBatch>>>,
}

impl StashReports {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last stashed batch, if any batch reached this processor.
    pub fn batch(&self) -> Option<ReportBatch> {
        self.dest.lock().clone()
    }
}

impl Processor for StashReports {
    fn process<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        batch: &'a mut ReportBatch,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            *self.dest.lock() = Some(batch.clone());
        })
    }

    fn name(&self) -> &'static str {
        "StashReports"
    }
}
