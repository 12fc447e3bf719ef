//! Configuration loader - build a chain from `[[processor]]` entries
//!
//! The configuration must have sections named `processor`, each of which
//! declares one processor for the chain, in order. For instance:
//!
//! ```toml
//! [[processor]]
//! type = "KeepNelReports"
//!
//! [[processor]]
//! type = "DumpReportsAsCLF"
//! dest = "stdout"
//! ```
//!
//! The `type` field selects the factory; any additional fields are
//! processor-specific configuration, handed to the factory verbatim.

use tokio_util::sync::CancellationToken;

use crate::chain::Chain;
use crate::error::ConfigError;
use crate::registry::ProcessorRegistry;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Load a processor chain from the contents of a TOML configuration file.
///
/// Every failure is fatal to the load; no partial chain is returned. The
/// cancellation token is handed through to context-aware factories.
pub fn load_chain(
    registry: &ProcessorRegistry,
    cancel: &CancellationToken,
    config: &[u8],
) -> Result<Chain, ConfigError> {
    let text = std::str::from_utf8(config).map_err(|_| ConfigError::Invalid)?;
    let doc: toml::Table = toml::from_str(text).map_err(|_| ConfigError::Invalid)?;

    let Some(entries) = doc.get("processor") else {
        return Err(ConfigError::MissingProcessors);
    };
    let entries = match entries {
        toml::Value::Array(entries) => entries,
        _ => return Err(ConfigError::Invalid),
    };
    if entries.is_empty() {
        return Err(ConfigError::EmptyProcessors);
    }

    let mut processors = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(table) = entry.as_table() else {
            return Err(ConfigError::NotAnObject(index));
        };
        let Some(kind) = table.get("type").and_then(toml::Value::as_str) else {
            return Err(ConfigError::MissingType(index));
        };
        let factory = registry.get(kind).ok_or_else(|| ConfigError::UnknownType {
            kind: kind.to_string(),
            index,
        })?;
        let processor =
            factory
                .create(cancel, table)
                .map_err(|source| ConfigError::CreateFailed {
                    kind: kind.to_string(),
                    index,
                    source,
                })?;
        processors.push(processor);
    }

    tracing::debug!(processors = processors.len(), "processor chain loaded");
    Ok(Chain::new(processors))
}
