//! ReportBatch - one upload plus its ingress metadata

use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Utc};

use crate::annotation::{AnnotationWriter, Annotations};
use crate::report::NelReport;

/// One upload from one client.
///
/// `time`, `collector_url`, `client_ip`, and `client_user_agent` are set
/// exactly once, at ingress, before any processor runs. Processors own the
/// batch they receive and may add, remove, or reorder reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBatch {
    /// Server receive time, read from the pipeline clock.
    pub time: DateTime<Utc>,
    /// URL on which the batch was received.
    pub collector_url: String,
    /// Client address with any port stripped.
    pub client_ip: IpAddr,
    /// Value of the `User-Agent` header, if any.
    pub client_user_agent: String,
    /// Reports in upload order.
    pub reports: Vec<NelReport>,
    /// Side-data attached by processors.
    pub annotations: Annotations,
}

impl Default for ReportBatch {
    fn default() -> Self {
        Self {
            time: DateTime::UNIX_EPOCH,
            collector_url: String::new(),
            client_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            client_user_agent: String::new(),
            reports: Vec::new(),
            annotations: Annotations::default(),
        }
    }
}

impl ReportBatch {
    /// Number of reports in the batch.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the batch holds no reports.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Shorthand for a writer over one of the batch annotations.
    pub fn annotation_writer(&mut self, name: impl Into<String>) -> AnnotationWriter<'_> {
        self.annotations.writer(name)
    }
}
