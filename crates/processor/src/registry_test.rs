//! Tests for the processor registry

use tokio_util::sync::CancellationToken;

use super::*;
use crate::{default_registry, KeepNelReports};

#[test]
fn test_default_registry_has_builtins() {
    let registry = default_registry();
    assert!(registry.contains("KeepNelReports"));
    assert!(registry.contains("DumpReportsAsCLF"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_create_from_factory() {
    let registry = default_registry();
    let factory = registry.get("KeepNelReports").unwrap();

    let processor = factory
        .create(&CancellationToken::new(), &toml::Table::new())
        .unwrap();
    assert_eq!(processor.name(), "KeepNelReports");
}

#[test]
fn test_unknown_type_is_none() {
    let registry = default_registry();
    assert!(registry.get("DoesNotExist").is_none());
    assert!(!registry.contains("DoesNotExist"));
}

#[test]
fn test_register_fn_sees_config() {
    let mut registry = ProcessorRegistry::new();
    registry.register_fn("Configured", |config| {
        assert_eq!(
            config.get("knob").and_then(toml::Value::as_str),
            Some("eleven")
        );
        Ok(Box::new(KeepNelReports))
    });

    let config: ProcessorConfig = toml::from_str(r#"knob = "eleven""#).unwrap();
    let factory = registry.get("Configured").unwrap();
    assert!(factory.create(&CancellationToken::new(), &config).is_ok());
    assert_eq!(factory.name(), "Configured");
}

#[test]
fn test_register_context_fn_sees_token() {
    let mut registry = ProcessorRegistry::new();
    registry.register_context_fn("Contextual", |cancel, _config| {
        assert!(!cancel.is_cancelled());
        Ok(Box::new(KeepNelReports))
    });

    let factory = registry.get("Contextual").unwrap();
    assert!(factory
        .create(&CancellationToken::new(), &ProcessorConfig::new())
        .is_ok());
}

#[test]
#[should_panic(expected = "already registered")]
fn test_duplicate_registration_panics() {
    let mut registry = ProcessorRegistry::new();
    registry.register_fn("Dup", |_| Ok(Box::new(KeepNelReports)));
    registry.register_fn("Dup", |_| Ok(Box::new(KeepNelReports)));
}

#[test]
fn test_available_types() {
    let registry = default_registry();
    let mut types = registry.available_types();
    types.sort_unstable();
    assert_eq!(types, vec!["DumpReportsAsCLF", "KeepNelReports"]);
}
