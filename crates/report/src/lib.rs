//! NEL Collector - Report model
//!
//! Data model and JSON codec for Network Error Logging reports delivered
//! via the Reporting API.
//!
//! # Overview
//!
//! Browsers upload reliability observations as a JSON array of report
//! objects. Each report has an `age`, a `type`, a `url`, and a
//! type-specific `body`. Reports of type `network-error` are decoded
//! field-by-field into typed NEL slots; any other report type keeps the
//! verbatim JSON text of its body so downstream processors can forward it
//! untouched.
//!
//! # Modules
//!
//! - `report` - `NelReport` and the spec-aware JSON codec
//! - `batch` - `ReportBatch`, one upload plus its ingress metadata
//! - `annotation` - named typed side-data on batches and reports
//! - `raw` - the self-inverse debug codec used by golden-file tests
//!
//! # Example
//!
//! ```ignore
//! use nel_report::{decode_reports, NEL_REPORT_TYPE};
//!
//! let reports = decode_reports(payload)?;
//! for report in &reports {
//!     if report.report_type == NEL_REPORT_TYPE {
//!         println!("{} -> {}", report.url, report.nel_type);
//!     }
//! }
//! ```

mod annotation;
mod batch;
mod error;
mod report;
pub mod raw;

pub use annotation::{AnnotationValue, AnnotationWriter, Annotations};
pub use batch::ReportBatch;
pub use error::CodecError;
pub use report::{decode_reports, encode_reports, NelReport, NEL_REPORT_TYPE};

/// Media type the Reporting API uses for report uploads.
pub const REPORT_CONTENT_TYPE: &str = "application/reports+json";
