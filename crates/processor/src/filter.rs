//! KeepNelReports - drop everything that is not a NEL report

use std::future::Future;
use std::pin::Pin;

use nel_report::ReportBatch;
use tokio_util::sync::CancellationToken;

use crate::registry::{ProcessorConfig, ProcessorFactory};
use crate::{Processor, ProcessorError};

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;

/// Processor that throws away any non-NEL reports, preserving the order of
/// the reports it keeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepNelReports;

impl KeepNelReports {
    pub const fn new() -> Self {
        Self
    }
}

impl Processor for KeepNelReports {
    fn process<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        batch: &'a mut ReportBatch,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            batch.reports.retain(|report| report.is_nel());
        })
    }

    fn name(&self) -> &'static str {
        "KeepNelReports"
    }
}

/// Factory for [`KeepNelReports`]; takes no configuration.
pub struct KeepNelReportsFactory;

impl ProcessorFactory for KeepNelReportsFactory {
    fn create(
        &self,
        _cancel: &CancellationToken,
        _config: &ProcessorConfig,
    ) -> Result<Box<dyn Processor>, ProcessorError> {
        Ok(Box::new(KeepNelReports))
    }

    fn name(&self) -> &'static str {
        "KeepNelReports"
    }
}
