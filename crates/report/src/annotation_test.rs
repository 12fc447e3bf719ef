//! Tests for the annotation store

use std::io::Write;
use std::sync::Arc;

use super::*;

#[test]
fn test_absent_annotation_is_none() {
    let annotations = Annotations::new();
    assert!(annotations.get("test").is_none());
    assert!(annotations.is_empty());
}

#[test]
fn test_get_or_add_inserts_once() {
    let mut annotations = Annotations::new();

    let value = annotations.get_or_add("test", "hello world");
    assert_eq!(value.as_str(), Some("hello world"));

    // A second get_or_add keeps the first value.
    let value = annotations.get_or_add("test", "other");
    assert_eq!(value.as_str(), Some("hello world"));

    assert_eq!(
        annotations.get("test").and_then(AnnotationValue::as_str),
        Some("hello world")
    );
}

#[test]
fn test_set_overwrites() {
    let mut annotations = Annotations::new();
    annotations.set("test", "hello world");
    annotations.set("test", "goodbye world");
    assert_eq!(
        annotations.get("test").and_then(AnnotationValue::as_str),
        Some("goodbye world")
    );
    assert_eq!(annotations.len(), 1);
}

#[test]
fn test_writer_creates_and_appends() {
    let mut annotations = Annotations::new();

    let mut writer = annotations.writer("log");
    writer.write_all(b"first ").unwrap();
    writer.write_all(b"second").unwrap();

    assert_eq!(
        annotations.get("log").and_then(AnnotationValue::as_bytes),
        Some(b"first second".as_slice())
    );
}

#[test]
fn test_writer_appends_to_existing_bytes() {
    let mut annotations = Annotations::new();
    annotations.set("log", b"head:".as_slice());

    annotations.writer("log").write_all(b"tail").unwrap();

    assert_eq!(
        annotations.get("log").and_then(AnnotationValue::as_bytes),
        Some(b"head:tail".as_slice())
    );
}

#[test]
fn test_writer_rejects_non_bytes() {
    let mut annotations = Annotations::new();
    annotations.set("count", 5i64);

    let err = annotations.writer("count").write(b"x").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

    // The original annotation is untouched.
    assert_eq!(
        annotations.get("count").and_then(|v| v.as_int()),
        Some(5)
    );
}

#[test]
fn test_annotations_are_independent() {
    let mut annotations = Annotations::new();
    annotations.set("x", "keep");
    annotations.set("y", 1i64);

    annotations.writer("z").write_all(b"bytes").unwrap();
    annotations.set("y", 2i64);

    assert_eq!(annotations.get("x").and_then(AnnotationValue::as_str), Some("keep"));
    assert_eq!(annotations.get("y").and_then(|v| v.as_int()), Some(2));
    assert_eq!(
        annotations.get("z").and_then(AnnotationValue::as_bytes),
        Some(b"bytes".as_slice())
    );
}

#[test]
fn test_opaque_downcast_and_identity() {
    let mut annotations = Annotations::new();
    let shared: Arc<dyn std::any::Any + Send + Sync> = Arc::new(vec![1u32, 2, 3]);
    annotations.set("stash", AnnotationValue::Opaque(Arc::clone(&shared)));

    let value = annotations.get("stash").unwrap();
    assert_eq!(value.downcast::<Vec<u32>>(), Some(&vec![1u32, 2, 3]));

    // Clones of the same Arc compare equal; a fresh Arc does not.
    assert_eq!(value, &AnnotationValue::Opaque(shared));
    let other: Arc<dyn std::any::Any + Send + Sync> = Arc::new(vec![1u32, 2, 3]);
    assert_ne!(value, &AnnotationValue::Opaque(other));
}

#[test]
fn test_encode_skips_opaque() {
    let mut annotations = Annotations::new();
    annotations.set("name", "value");
    annotations.set(
        "stash",
        AnnotationValue::Opaque(Arc::new(42u8) as Arc<dyn std::any::Any + Send + Sync>),
    );

    let json = serde_json::to_string(&annotations).unwrap();
    let decoded: Annotations = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded.get("name").and_then(AnnotationValue::as_str), Some("value"));
}

#[test]
fn test_encode_round_trip() {
    let mut annotations = Annotations::new();
    annotations.set("bytes", b"abc".as_slice());
    annotations.set("string", "text");
    annotations.set("int", 7i64);
    annotations.set("float", 0.5f64);

    let json = serde_json::to_string(&annotations).unwrap();
    let decoded: Annotations = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, annotations);
}
