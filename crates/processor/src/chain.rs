//! Processor chain - sequential batch processing
//!
//! The `Chain` applies every processor in registration order to each batch
//! a worker hands it. Processors see each other's mutations; a processor
//! that fails internally has no way to stop the chain.

use nel_report::ReportBatch;
use tokio_util::sync::CancellationToken;

use crate::Processor;

#[cfg(test)]
#[path = "chain_test.rs"]
mod tests;

/// Ordered list of processors applied to every batch.
#[derive(Default)]
pub struct Chain {
    processors: Vec<Box<dyn Processor>>,
}

impl Chain {
    /// Create a chain from an ordered list of processors.
    pub fn new(processors: Vec<Box<dyn Processor>>) -> Self {
        Self { processors }
    }

    /// Create an empty chain (no-op).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a processor to the end of the chain.
    pub fn push(&mut self, processor: Box<dyn Processor>) {
        self.processors.push(processor);
    }

    /// Number of processors in the chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether the chain has no processors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Names of the processors, in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Get a processor by name.
    pub fn get(&self, name: &str) -> Option<&dyn Processor> {
        self.processors
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Run every processor against the batch, in order.
    ///
    /// Within a batch, each processor sees the mutations of the ones
    /// before it. Processors surface their own failures through
    /// annotations or their sinks; the chain always runs to the end.
    pub async fn process(&self, cancel: &CancellationToken, batch: &mut ReportBatch) {
        for processor in &self.processors {
            processor.process(cancel, batch).await;
        }
    }

    /// Close every processor, releasing held resources.
    ///
    /// A processor that fails to close is logged and does not prevent the
    /// rest from closing.
    pub fn close(&self) {
        for processor in &self.processors {
            if let Err(error) = processor.close() {
                tracing::warn!(processor = processor.name(), %error, "processor close failed");
            }
        }
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("processors", &self.names()).finish()
    }
}
