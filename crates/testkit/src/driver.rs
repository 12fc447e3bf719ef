//! Golden-file pipeline driver
//!
//! Automates running a pipeline against a directory of test uploads. Each
//! payload under `<testdata>/reports/` is fake-uploaded twice, once from
//! an IPv4 remote and once from IPv6, with a simulated clock pinned to
//! the Unix epoch. The chain under test must leave its output in the
//! batch `TestResult` annotation; the driver appends a [`StashReports`]
//! to recover the batch and compares the annotation against
//! `<testdata>/<TestName>/<payload>.<iptag><ext>`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::Uri;
use nel_pipeline::{IngestOutcome, Pipeline, PipelineConfig, UploadRequest};
use nel_processor::{Chain, TEST_RESULT_ANNOTATION};
use nel_report::AnnotationValue;

use crate::clock::SimulatedClock;
use crate::golden::{goldendata, testdata};
use crate::stash::StashReports;

const IP_CASES: [(&str, &str); 2] = [
    ("ipv4", "192.0.2.1:1234"),
    ("ipv6", "[2001:db8::2]:1234"),
];

/// Runs a pipeline against every payload in a testdata directory and
/// checks the `TestResult` annotation against golden files.
///
/// Golden files with a `.json` extension are compared structurally;
/// anything else is compared byte-for-byte.
pub struct PipelineTest<F: Fn() -> Chain> {
    /// Name of the test; also the golden-file subdirectory. Must be
    /// unique across tests sharing a testdata directory.
    pub test_name: &'static str,

    /// Directory holding `reports/` and the golden subdirectory.
    pub testdata_dir: PathBuf,

    /// Extension of the golden files, e.g. `.log` or `.json`.
    pub output_extension: &'static str,

    /// Builds the chain under test; called once per test case. It should
    /// end up writing a `TestResult` byte annotation on the batch.
    pub build_chain: F,
}

impl<F: Fn() -> Chain> PipelineTest<F> {
    /// Run all test cases, panicking on the first mismatch.
    pub async fn run(&self) {
        let payloads = self.payload_names();
        assert!(
            !payloads.is_empty(),
            "no payloads under {}",
            self.testdata_dir.join("reports").display()
        );

        for payload in &payloads {
            for (tag, remote) in IP_CASES {
                self.run_case(payload, tag, remote).await;
            }
        }
    }

    async fn run_case(&self, payload: &str, tag: &str, remote: &str) {
        let case = format!("{}/{payload}:{tag}", self.test_name);
        let input = testdata(
            &self
                .testdata_dir
                .join("reports")
                .join(format!("{payload}.json")),
        );

        let mut chain = (self.build_chain)();
        let stash = StashReports::new();
        chain.push(Box::new(stash.clone()));

        let pipeline = Pipeline::new(
            PipelineConfig {
                queue_size: 16,
                workers: 1,
            },
            chain,
            Arc::new(SimulatedClock::new()),
        );

        let request = UploadRequest::post(
            Uri::from_static("https://example.com/upload/"),
            remote,
            input,
        );
        let outcome = pipeline
            .ingest(request)
            .await
            .unwrap_or_else(|error| panic!("{case}: ingest failed: {error}"));
        assert_eq!(outcome, IngestOutcome::Enqueued, "{case}: upload dropped");
        pipeline.close().await;

        let batch = stash
            .batch()
            .unwrap_or_else(|| panic!("{case}: batch never reached the chain"));
        let got = batch
            .annotations
            .get(TEST_RESULT_ANNOTATION)
            .and_then(AnnotationValue::as_bytes)
            .unwrap_or_else(|| panic!("{case}: no TestResult annotation"))
            .to_vec();

        let golden_path = self
            .testdata_dir
            .join(self.test_name)
            .join(format!("{payload}.{tag}{}", self.output_extension));
        let want = goldendata(&golden_path, &got);

        if self.output_extension.ends_with(".json") {
            let got: serde_json::Value = serde_json::from_slice(&got)
                .unwrap_or_else(|error| panic!("{case}: output is not JSON: {error}"));
            let want: serde_json::Value = serde_json::from_slice(&want)
                .unwrap_or_else(|error| panic!("{case}: golden is not JSON: {error}"));
            assert_eq!(got, want, "{case}: output differs from golden file");
        } else {
            assert_eq!(
                String::from_utf8_lossy(&got),
                String::from_utf8_lossy(&want),
                "{case}: output differs from golden file"
            );
        }
    }

    fn payload_names(&self) -> Vec<String> {
        let reports_dir = self.testdata_dir.join("reports");
        let mut names: Vec<String> = std::fs::read_dir(&reports_dir)
            .unwrap_or_else(|error| panic!("failed to read {}: {error}", reports_dir.display()))
            .filter_map(|entry| {
                let name = entry.ok()?.file_name().into_string().ok()?;
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect();
        names.sort();
        names
    }
}
