//! Tests for the CLF dumper

use std::io::Write;
use std::sync::Arc;

use nel_report::{decode_reports, AnnotationValue, ReportBatch};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::*;

/// Cloneable writer the test can read back after the processor ran.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn epoch_batch(payload: &[u8], client_ip: &str) -> ReportBatch {
    ReportBatch {
        client_ip: client_ip.parse().unwrap(),
        reports: decode_reports(payload).unwrap(),
        ..ReportBatch::default()
    }
}

const VALID_NEL: &[u8] = br#"[
  {"age": 500, "type": "network-error", "url": "https://example.com/about/",
   "body": {"status-code": 200, "elapsed-time": 45, "type": "ok"}}
]"#;

#[tokio::test]
async fn test_clf_line_for_successful_nel_report() {
    let mut batch = epoch_batch(VALID_NEL, "192.0.2.1");
    let buf = SharedBuf::default();

    DumpReportsAsClf::to_writer(buf.clone())
        .process(&CancellationToken::new(), &mut batch)
        .await;

    assert_eq!(
        String::from_utf8(buf.0.lock().clone()).unwrap(),
        "192.0.2.1 - - [01/Jan/1970:00:00:00.000 +0000] \"GET https://example.com/about/\" 200 -\n"
    );
}

#[tokio::test]
async fn test_clf_line_for_ipv6_client() {
    let mut batch = epoch_batch(VALID_NEL, "2001:db8::2");
    let buf = SharedBuf::default();

    DumpReportsAsClf::to_writer(buf.clone())
        .process(&CancellationToken::new(), &mut batch)
        .await;

    assert_eq!(
        String::from_utf8(buf.0.lock().clone()).unwrap(),
        "2001:db8::2 - - [01/Jan/1970:00:00:00.000 +0000] \"GET https://example.com/about/\" 200 -\n"
    );
}

#[tokio::test]
async fn test_clf_result_column_variants() {
    let payload = br#"[
      {"age": 1, "type": "network-error", "url": "https://example.com/ok/",
       "body": {"status-code": 200, "type": "ok"}},
      {"age": 2, "type": "network-error", "url": "https://example.com/err/",
       "body": {"status-code": 500, "type": "http.error"}},
      {"age": 3, "type": "network-error", "url": "https://example.com/dns/",
       "body": {"type": "dns.name_not_resolved"}},
      {"age": 4, "type": "another-error", "url": "https://example.com/other/",
       "body": {"random": "stuff"}}
    ]"#;
    let mut batch = epoch_batch(payload, "192.0.2.1");
    let buf = SharedBuf::default();

    DumpReportsAsClf::to_writer(buf.clone())
        .process(&CancellationToken::new(), &mut batch)
        .await;

    let output = String::from_utf8(buf.0.lock().clone()).unwrap();
    let results: Vec<&str> = output
        .lines()
        .map(|line| line.rsplit(' ').nth(1).unwrap())
        .collect();
    assert_eq!(results, vec!["200", "500", "dns.name_not_resolved", "<another-error>"]);
}

#[tokio::test]
async fn test_dump_to_annotation_when_no_writer() {
    let mut batch = epoch_batch(VALID_NEL, "192.0.2.1");

    DumpReportsAsClf::to_annotation()
        .process(&CancellationToken::new(), &mut batch)
        .await;

    let result = batch
        .annotations
        .get(TEST_RESULT_ANNOTATION)
        .and_then(AnnotationValue::as_bytes)
        .expect("TestResult annotation should be set");
    assert!(result.ends_with(b"\"GET https://example.com/about/\" 200 -\n"));
}

#[tokio::test]
async fn test_annotation_dump_appends_across_runs() {
    let mut batch = epoch_batch(VALID_NEL, "192.0.2.1");
    let dumper = DumpReportsAsClf::to_annotation();
    let cancel = CancellationToken::new();

    dumper.process(&cancel, &mut batch).await;
    dumper.process(&cancel, &mut batch).await;

    let result = batch
        .annotations
        .get(TEST_RESULT_ANNOTATION)
        .and_then(AnnotationValue::as_bytes)
        .unwrap();
    assert_eq!(result.iter().filter(|&&b| b == b'\n').count(), 2);
}

#[test]
fn test_factory_requires_dest() {
    let factory = DumpReportsAsClfFactory;
    let cancel = CancellationToken::new();

    let err = match factory.create(&cancel, &toml::Table::new()) {
        Err(e) => e,
        Ok(_) => panic!("expected error"),
    };
    assert_eq!(err.to_string(), "DumpReportsAsCLF missing `dest`");

    let config: toml::Table = toml::from_str(r#"dest = "nowhere""#).unwrap();
    let err = match factory.create(&cancel, &config) {
        Err(e) => e,
        Ok(_) => panic!("expected error"),
    };
    assert_eq!(err.to_string(), "DumpReportsAsCLF invalid `dest`: nowhere");
}

#[test]
fn test_factory_accepts_both_destinations() {
    let factory = DumpReportsAsClfFactory;
    let cancel = CancellationToken::new();

    for dest in ["stdout", "annotation"] {
        let config: toml::Table = toml::from_str(&format!(r#"dest = "{dest}""#)).unwrap();
        assert!(factory.create(&cancel, &config).is_ok(), "dest {dest}");
    }
}
