//! NelReport - one reliability observation plus the spec-aware JSON codec
//!
//! Decoding follows the Reporting spec: an upload is a JSON array of report
//! objects. For `type = "network-error"` the `body` is decoded into the
//! typed NEL fields using the spec field names; for every other type the
//! verbatim JSON text of the body object is kept in `raw_body` so it can be
//! re-emitted byte-for-byte. Emission is the inverse.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{self, Serialize, SerializeStruct, Serializer};
use serde_json::value::RawValue;

use crate::annotation::Annotations;
use crate::error::CodecError;

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;

/// Report type that identifies a Network Error Logging report.
pub const NEL_REPORT_TYPE: &str = "network-error";

/// One observation uploaded by a reporter.
///
/// The typed NEL fields are populated only when `report_type` is
/// [`NEL_REPORT_TYPE`]; otherwise they are zero-valued and `raw_body`
/// holds the exact bytes of the original `body` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NelReport {
    /// Milliseconds between the observation and its upload.
    pub age: u64,
    /// Report type; `"network-error"` marks a NEL report.
    pub report_type: String,
    /// URL of the observed request.
    pub url: String,

    pub referrer: String,
    pub sampling_fraction: f64,
    pub server_ip: String,
    pub protocol: String,
    pub method: String,
    pub status_code: i64,
    /// Milliseconds the observed request took.
    pub elapsed_time: u64,
    pub phase: String,
    /// NEL outcome code, e.g. `ok`, `http.error`, `dns.name_not_resolved`.
    pub nel_type: String,

    /// Verbatim body JSON for non-NEL reports; empty for NEL reports.
    pub raw_body: Vec<u8>,

    /// Side-data attached by processors.
    pub annotations: Annotations,
}

impl NelReport {
    /// Whether this is a Network Error Logging report.
    pub fn is_nel(&self) -> bool {
        self.report_type == NEL_REPORT_TYPE
    }
}

/// Decode one upload payload: a JSON array of report objects.
pub fn decode_reports(bytes: &[u8]) -> Result<Vec<NelReport>, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Emit reports in the upload wire format. Inverse of [`decode_reports`].
pub fn encode_reports(reports: &[NelReport]) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(reports)?)
}

/// Envelope of a report object on the wire.
#[derive(serde::Deserialize)]
struct WireReport {
    #[serde(default)]
    age: u64,
    #[serde(rename = "type", default)]
    report_type: String,
    #[serde(default)]
    url: String,
    body: Option<Box<RawValue>>,
}

/// NEL body with the field names the spec uses.
#[derive(Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct WireBody {
    #[serde(skip_serializing_if = "String::is_empty")]
    uri: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    referrer: String,
    #[serde(rename = "sampling-fraction", skip_serializing_if = "is_zero_f64")]
    sampling_fraction: f64,
    #[serde(rename = "server-ip", skip_serializing_if = "String::is_empty")]
    server_ip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    protocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    method: String,
    #[serde(rename = "status-code", skip_serializing_if = "is_zero_i64")]
    status_code: i64,
    #[serde(rename = "elapsed-time", skip_serializing_if = "is_zero_u64")]
    elapsed_time: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    phase: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    nel_type: String,
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

impl<'de> Deserialize<'de> for NelReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireReport::deserialize(deserializer)?;
        let mut report = NelReport {
            age: wire.age,
            report_type: wire.report_type,
            url: wire.url,
            ..NelReport::default()
        };

        let Some(body) = wire.body else {
            return Ok(report);
        };

        if report.report_type == NEL_REPORT_TYPE {
            // The body `uri` duplicates the report `url` and is dropped.
            let body: WireBody = serde_json::from_str(body.get()).map_err(de::Error::custom)?;
            report.referrer = body.referrer;
            report.sampling_fraction = body.sampling_fraction;
            report.server_ip = body.server_ip;
            report.protocol = body.protocol;
            report.method = body.method;
            report.status_code = body.status_code;
            report.elapsed_time = body.elapsed_time;
            report.phase = body.phase;
            report.nel_type = body.nel_type;
        } else {
            report.raw_body = body.get().as_bytes().to_vec();
        }

        Ok(report)
    }
}

impl Serialize for NelReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body: Option<Box<RawValue>> = if self.is_nel() {
            let body = WireBody {
                uri: self.url.clone(),
                referrer: self.referrer.clone(),
                sampling_fraction: self.sampling_fraction,
                server_ip: self.server_ip.clone(),
                protocol: self.protocol.clone(),
                method: self.method.clone(),
                status_code: self.status_code,
                elapsed_time: self.elapsed_time,
                phase: self.phase.clone(),
                nel_type: self.nel_type.clone(),
            };
            Some(serde_json::value::to_raw_value(&body).map_err(ser::Error::custom)?)
        } else if self.raw_body.is_empty() {
            None
        } else {
            let text = std::str::from_utf8(&self.raw_body).map_err(ser::Error::custom)?;
            Some(RawValue::from_string(text.to_string()).map_err(ser::Error::custom)?)
        };

        let fields = if body.is_some() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("NelReport", fields)?;
        state.serialize_field("age", &self.age)?;
        state.serialize_field("type", &self.report_type)?;
        state.serialize_field("url", &self.url)?;
        if let Some(body) = &body {
            state.serialize_field("body", body)?;
        }
        state.end()
    }
}
