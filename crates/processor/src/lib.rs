//! NEL Collector - Processors
//!
//! Processor chain for report batch transformation in-flight.
//!
//! # Overview
//!
//! Processors implement the discrete steps a collector applies to each
//! uploaded batch. They can:
//! - Filter reports (drop everything that is not a NEL report)
//! - Annotate batches or individual reports with side-data
//! - Emit reports to an external sink (CLF access-log lines)
//!
//! Processors run strictly in registration order and see each other's
//! mutations. They have no error channel back to the pipeline: a failing
//! processor records what went wrong in an annotation or its own sink, and
//! the remaining processors still run.
//!
//! # Architecture
//!
//! ```text
//! [ReportBatch] → [Processor 1] → [Processor 2] → ... → [ReportBatch']
//! ```
//!
//! # Adding a new processor
//!
//! 1. Implement [`Processor`] on your struct.
//! 2. Implement [`ProcessorFactory`] (or use `register_fn` /
//!    `register_context_fn` with a closure) to build it from the raw TOML
//!    of its `[[processor]]` entry.
//! 3. Register the factory and load the chain with [`load_chain`].
//!
//! # Modules
//!
//! - `chain` - sequential processor execution
//! - `registry` - name → factory map for config-driven instantiation
//! - `config` - `[[processor]]` TOML loader
//! - `filter` - `KeepNelReports`, drops non-NEL reports
//! - `clf` - `DumpReportsAsCLF`, Apache-style access-log emission

mod chain;
mod clf;
mod config;
mod error;
mod filter;
mod registry;

pub use chain::Chain;
pub use clf::{DumpReportsAsClf, DumpReportsAsClfFactory, TEST_RESULT_ANNOTATION};
pub use config::load_chain;
pub use error::{ConfigError, ProcessorError};
pub use filter::{KeepNelReports, KeepNelReportsFactory};
pub use registry::{ProcessorConfig, ProcessorFactory, ProcessorRegistry};

use std::future::Future;
use std::pin::Pin;

use nel_report::ReportBatch;
use tokio_util::sync::CancellationToken;

/// Trait for batch processors.
///
/// Implementors must be `Send + Sync`; a processor instance is shared by
/// every worker of the pipeline it belongs to, though calls for a single
/// batch are always serialized.
///
/// The cancellation token is the request context: long-running processors
/// should check it cooperatively, the pipeline never interrupts them.
///
/// # Example
///
/// ```ignore
/// struct CountReports;
///
/// impl Processor for CountReports {
///     fn process<'a>(
///         &'a self,
///         _cancel: &'a CancellationToken,
///         batch: &'a mut ReportBatch,
///     ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
///         Box::pin(async move {
///             let count = batch.len() as i64;
///             batch.annotations.set("count", count);
///         })
///     }
///
///     fn name(&self) -> &'static str {
///         "CountReports"
///     }
/// }
/// ```
pub trait Processor: Send + Sync {
    /// Handle a single batch of reports.
    ///
    /// The processor has full control over the batch: it may remove
    /// reports, update their contents, or attach annotations.
    fn process<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        batch: &'a mut ReportBatch,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    /// Name of this processor for logging.
    fn name(&self) -> &'static str;

    /// Release resources held by this processor.
    ///
    /// Called once, during pipeline shutdown or hot swap. Implementations
    /// should flush any buffered output. Default is a no-op.
    fn close(&self) -> Result<(), ProcessorError> {
        Ok(())
    }
}

/// Create a registry with the built-in processors registered.
///
/// Includes:
/// - `KeepNelReports` - drop reports whose type is not `network-error`
/// - `DumpReportsAsCLF` - write one CLF line per report
pub fn default_registry() -> ProcessorRegistry {
    let mut registry = ProcessorRegistry::new();
    registry.register("KeepNelReports", KeepNelReportsFactory);
    registry.register("DumpReportsAsCLF", DumpReportsAsClfFactory);
    registry
}
