//! Processor and configuration error types

use thiserror::Error;

/// Errors from constructing or closing a processor
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Invalid processor-specific configuration
    #[error("{0}")]
    Config(String),

    /// I/O error (e.g. flushing an output sink)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessorError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors from loading a processor chain out of a configuration document.
///
/// All of these are fatal to the load; no partial chain is ever built. The
/// message text is stable and asserted by operators' tooling, so change it
/// deliberately.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document does not parse, or `processor` has the wrong type
    #[error("Invalid NEL configuration")]
    Invalid,

    /// No `processor` entries at all
    #[error("NEL configuration missing `processors`")]
    MissingProcessors,

    /// `processor = []`
    #[error("NEL configuration `processors` array must be non-empty")]
    EmptyProcessors,

    /// An entry is not a TOML table
    #[error("Processor config {0} must be an object")]
    NotAnObject(usize),

    /// An entry has no `type` string
    #[error("Processor config {0} is missing `type`")]
    MissingType(usize),

    /// No factory registered for the entry's `type`
    #[error("Unknown processor type {kind} for processor {index}")]
    UnknownType { kind: String, index: usize },

    /// The factory rejected the entry
    #[error("Couldn't create a {kind} for processor {index}: {source}")]
    CreateFailed {
        kind: String,
        index: usize,
        source: ProcessorError,
    },
}
