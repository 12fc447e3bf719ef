//! Processor registry - config-driven processor creation
//!
//! The registry maps processor type names to factories so a TOML document
//! can describe the pipeline. Factories get the raw table of their
//! `[[processor]]` entry and interpret it however they need.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::{Processor, ProcessorError};

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Configuration handed to a factory: the verbatim TOML table of the
/// `[[processor]]` entry, `type` field included.
pub type ProcessorConfig = toml::Table;

/// Factory trait for creating processors from configuration.
///
/// The cancellation token passed to `create` is the load context;
/// factories that reach out to external services during construction
/// should honor it. Most factories ignore it.
pub trait ProcessorFactory: Send + Sync {
    /// Create a processor instance from its configuration entry.
    fn create(
        &self,
        cancel: &CancellationToken,
        config: &ProcessorConfig,
    ) -> Result<Box<dyn Processor>, ProcessorError>;

    /// Human-readable name for this factory (for error messages).
    fn name(&self) -> &'static str;
}

/// Registry of processor factories.
///
/// Built once at startup and read-only afterwards; the loader borrows it,
/// it is never global state.
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: HashMap<String, Box<dyn ProcessorFactory>>,
}

impl ProcessorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor factory under a type name.
    ///
    /// # Panics
    /// Panics if a factory is already registered with this name.
    pub fn register<F: ProcessorFactory + 'static>(&mut self, type_name: &str, factory: F) {
        if self.factories.contains_key(type_name) {
            panic!("processor factory '{}' already registered", type_name);
        }
        self.factories
            .insert(type_name.to_string(), Box::new(factory));
    }

    /// Register a plain function as a factory.
    ///
    /// The function only sees the configuration entry; use
    /// [`register_context_fn`](Self::register_context_fn) when it needs
    /// the load context too.
    pub fn register_fn<F>(&mut self, type_name: &'static str, create: F)
    where
        F: Fn(&ProcessorConfig) -> Result<Box<dyn Processor>, ProcessorError>
            + Send
            + Sync
            + 'static,
    {
        self.register(type_name, FnFactory { name: type_name, create });
    }

    /// Register a context-aware function as a factory.
    pub fn register_context_fn<F>(&mut self, type_name: &'static str, create: F)
    where
        F: Fn(&CancellationToken, &ProcessorConfig) -> Result<Box<dyn Processor>, ProcessorError>
            + Send
            + Sync
            + 'static,
    {
        self.register(type_name, ContextFnFactory { name: type_name, create });
    }

    /// Look up the factory for a type name.
    pub fn get(&self, type_name: &str) -> Option<&dyn ProcessorFactory> {
        self.factories.get(type_name).map(|f| f.as_ref())
    }

    /// Check whether a type name is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names.
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

struct FnFactory<F> {
    name: &'static str,
    create: F,
}

impl<F> ProcessorFactory for FnFactory<F>
where
    F: Fn(&ProcessorConfig) -> Result<Box<dyn Processor>, ProcessorError> + Send + Sync,
{
    fn create(
        &self,
        _cancel: &CancellationToken,
        config: &ProcessorConfig,
    ) -> Result<Box<dyn Processor>, ProcessorError> {
        (self.create)(config)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

struct ContextFnFactory<F> {
    name: &'static str,
    create: F,
}

impl<F> ProcessorFactory for ContextFnFactory<F>
where
    F: Fn(&CancellationToken, &ProcessorConfig) -> Result<Box<dyn Processor>, ProcessorError>
        + Send
        + Sync,
{
    fn create(
        &self,
        cancel: &CancellationToken,
        config: &ProcessorConfig,
    ) -> Result<Box<dyn Processor>, ProcessorError> {
        (self.create)(cancel, config)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
