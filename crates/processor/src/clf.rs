//! DumpReportsAsCLF - Apache-style access-log emission
//!
//! Writes one line per report in a format not unlike Apache's CLF
//! access.log, e.g.
//!
//! ```text
//! 192.0.2.1 - - [01/Jan/1970:00:00:00.000 +0000] "GET https://example.com/about/" 200 -
//! ```
//!
//! The result column is the status code for completed requests
//! (`ok` / `http.error`), the NEL outcome code for everything else, or the
//! report type in angle brackets for non-NEL reports.

use std::future::Future;
use std::io::{self, Write};
use std::net::IpAddr;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use nel_report::{NelReport, ReportBatch};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::registry::{ProcessorConfig, ProcessorFactory};
use crate::{Processor, ProcessorError};

#[cfg(test)]
#[path = "clf_test.rs"]
mod tests;

/// Batch annotation that collects CLF lines when no writer is configured.
pub const TEST_RESULT_ANNOTATION: &str = "TestResult";

/// Apache access-log timestamp, millisecond precision.
const CLF_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S%.3f %z";

/// Processor that prints a CLF summary of each report.
///
/// Lines go to the configured writer, or, when none is configured, are
/// appended to the batch's [`TEST_RESULT_ANNOTATION`] byte annotation.
pub struct DumpReportsAsClf {
    writer: Option<Mutex<Box<dyn Write + Send>>>,
}

impl DumpReportsAsClf {
    /// Dump into the `TestResult` annotation of each batch.
    pub fn to_annotation() -> Self {
        Self { writer: None }
    }

    /// Dump to an owned writer.
    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Some(Mutex::new(Box::new(writer))),
        }
    }

    /// Dump to process stdout.
    pub fn to_stdout() -> Self {
        Self::to_writer(io::stdout())
    }
}

impl Processor for DumpReportsAsClf {
    fn process<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        batch: &'a mut ReportBatch,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let mut lines = String::new();
            for report in &batch.reports {
                lines.push_str(&format_line(batch.time, batch.client_ip, report));
            }

            let result = match &self.writer {
                Some(writer) => writer.lock().write_all(lines.as_bytes()),
                None => batch
                    .annotation_writer(TEST_RESULT_ANNOTATION)
                    .write_all(lines.as_bytes()),
            };
            if let Err(error) = result {
                tracing::warn!(%error, "failed to write CLF lines");
            }
        })
    }

    fn name(&self) -> &'static str {
        "DumpReportsAsCLF"
    }

    fn close(&self) -> Result<(), ProcessorError> {
        if let Some(writer) = &self.writer {
            writer.lock().flush()?;
        }
        Ok(())
    }
}

/// Format one CLF line for a report. Times are rendered in UTC.
fn format_line(time: DateTime<Utc>, client_ip: IpAddr, report: &NelReport) -> String {
    format!(
        "{} - - [{}] \"GET {}\" {} -\n",
        client_ip,
        time.format(CLF_TIME_FORMAT),
        report.url,
        format_result(report),
    )
}

fn format_result(report: &NelReport) -> String {
    if !report.is_nel() {
        format!("<{}>", report.report_type)
    } else if matches!(report.nel_type.as_str(), "ok" | "http.error") {
        report.status_code.to_string()
    } else {
        report.nel_type.clone()
    }
}

/// Factory for [`DumpReportsAsClf`].
///
/// Requires a `dest` field: `stdout` writes to process stdout,
/// `annotation` collects lines in the batch `TestResult` annotation.
pub struct DumpReportsAsClfFactory;

impl ProcessorFactory for DumpReportsAsClfFactory {
    fn create(
        &self,
        _cancel: &CancellationToken,
        config: &ProcessorConfig,
    ) -> Result<Box<dyn Processor>, ProcessorError> {
        let Some(dest) = config.get("dest").and_then(toml::Value::as_str) else {
            return Err(ProcessorError::config("DumpReportsAsCLF missing `dest`"));
        };
        match dest {
            "stdout" => Ok(Box::new(DumpReportsAsClf::to_stdout())),
            "annotation" => Ok(Box::new(DumpReportsAsClf::to_annotation())),
            other => Err(ProcessorError::Config(format!(
                "DumpReportsAsCLF invalid `dest`: {other}"
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "DumpReportsAsCLF"
    }
}
