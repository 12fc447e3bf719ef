//! Raw codec - dump the in-memory representation as-is
//!
//! Unlike the upload codec, which speaks the Reporting wire format, the
//! raw codec writes the typed NEL fields and `raw_body` side by side, plus any
//! encodable annotations. It is its own inverse and exists for test cases
//! and golden-file comparisons that need to see exactly what a pipeline
//! left behind.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::annotation::Annotations;
use crate::batch::ReportBatch;
use crate::error::CodecError;
use crate::report::NelReport;

#[cfg(test)]
#[path = "raw_test.rs"]
mod tests;

#[derive(Serialize, Deserialize)]
struct RawReport {
    age: u64,
    report_type: String,
    url: String,
    referrer: String,
    sampling_fraction: f64,
    server_ip: String,
    protocol: String,
    method: String,
    status_code: i64,
    elapsed_time: u64,
    phase: String,
    nel_type: String,
    raw_body: Vec<u8>,
    annotations: Annotations,
}

impl From<&NelReport> for RawReport {
    fn from(report: &NelReport) -> Self {
        Self {
            age: report.age,
            report_type: report.report_type.clone(),
            url: report.url.clone(),
            referrer: report.referrer.clone(),
            sampling_fraction: report.sampling_fraction,
            server_ip: report.server_ip.clone(),
            protocol: report.protocol.clone(),
            method: report.method.clone(),
            status_code: report.status_code,
            elapsed_time: report.elapsed_time,
            phase: report.phase.clone(),
            nel_type: report.nel_type.clone(),
            raw_body: report.raw_body.clone(),
            annotations: report.annotations.clone(),
        }
    }
}

impl From<RawReport> for NelReport {
    fn from(raw: RawReport) -> Self {
        Self {
            age: raw.age,
            report_type: raw.report_type,
            url: raw.url,
            referrer: raw.referrer,
            sampling_fraction: raw.sampling_fraction,
            server_ip: raw.server_ip,
            protocol: raw.protocol,
            method: raw.method,
            status_code: raw.status_code,
            elapsed_time: raw.elapsed_time,
            phase: raw.phase,
            nel_type: raw.nel_type,
            raw_body: raw.raw_body,
            annotations: raw.annotations,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawBatch {
    time: DateTime<Utc>,
    collector_url: String,
    client_ip: IpAddr,
    client_user_agent: String,
    annotations: Annotations,
    reports: Vec<RawReport>,
}

/// Dump reports without the upload wire rules. Inverse of
/// [`decode_raw_reports`].
pub fn encode_raw_reports(reports: &[NelReport]) -> Result<Vec<u8>, CodecError> {
    let raw: Vec<RawReport> = reports.iter().map(RawReport::from).collect();
    Ok(serde_json::to_vec_pretty(&raw)?)
}

/// Read reports dumped by [`encode_raw_reports`].
pub fn decode_raw_reports(bytes: &[u8]) -> Result<Vec<NelReport>, CodecError> {
    let raw: Vec<RawReport> = serde_json::from_slice(bytes)?;
    Ok(raw.into_iter().map(NelReport::from).collect())
}

/// Dump a whole batch, annotations included. Inverse of
/// [`decode_raw_batch`].
pub fn encode_raw_batch(batch: &ReportBatch) -> Result<Vec<u8>, CodecError> {
    let raw = RawBatch {
        time: batch.time,
        collector_url: batch.collector_url.clone(),
        client_ip: batch.client_ip,
        client_user_agent: batch.client_user_agent.clone(),
        annotations: batch.annotations.clone(),
        reports: batch.reports.iter().map(RawReport::from).collect(),
    };
    Ok(serde_json::to_vec_pretty(&raw)?)
}

/// Read a batch dumped by [`encode_raw_batch`].
pub fn decode_raw_batch(bytes: &[u8]) -> Result<ReportBatch, CodecError> {
    let raw: RawBatch = serde_json::from_slice(bytes)?;
    Ok(ReportBatch {
        time: raw.time,
        collector_url: raw.collector_url,
        client_ip: raw.client_ip,
        client_user_agent: raw.client_user_agent,
        annotations: raw.annotations,
        reports: raw.reports.into_iter().map(NelReport::from).collect(),
    })
}
