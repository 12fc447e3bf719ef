//! Annotations - named typed side-data on batches and reports
//!
//! Processors coordinate exclusively through annotations: one step records
//! what it learned under a name, a later step picks it up. Each annotation
//! has a name and a tagged value; it is up to the processors involved not
//! to make conflicting assumptions about the type stored under a name.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{self, Serialize, SerializeMap, Serializer};

#[cfg(test)]
#[path = "annotation_test.rs"]
mod tests;

/// A single annotation value.
///
/// The first four variants survive the raw codec; `Opaque` holds an
/// arbitrary shared value for in-memory hand-off between processors and is
/// skipped when a batch is raw-encoded.
#[derive(Clone)]
pub enum AnnotationValue {
    Bytes(Vec<u8>),
    String(String),
    Int(i64),
    Float(f64),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl AnnotationValue {
    /// View the value as a byte slice, if it is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// View the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// View the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// View the value as a float, if it is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Downcast an `Opaque` value to a concrete type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            Self::Opaque(value) => value.downcast_ref(),
            _ => None,
        }
    }

    fn is_encodable(&self) -> bool {
        !matches!(self, Self::Opaque(_))
    }
}

impl fmt::Debug for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Self::String(value) => f.debug_tuple("String").field(value).finish(),
            Self::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Self::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl PartialEq for AnnotationValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            // Opaque values compare by identity; two clones of the same
            // Arc are the same annotation.
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Vec<u8>> for AnnotationValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for AnnotationValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<String> for AnnotationValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for AnnotationValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AnnotationValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Wire form of an encodable annotation value.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum EncodedValue {
    Bytes(Vec<u8>),
    String(String),
    Int(i64),
    Float(f64),
}

impl Serialize for AnnotationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = match self {
            Self::Bytes(bytes) => EncodedValue::Bytes(bytes.clone()),
            Self::String(value) => EncodedValue::String(value.clone()),
            Self::Int(value) => EncodedValue::Int(*value),
            Self::Float(value) => EncodedValue::Float(*value),
            Self::Opaque(_) => {
                return Err(ser::Error::custom("opaque annotation value is not encodable"))
            }
        };
        encoded.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnnotationValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match EncodedValue::deserialize(deserializer)? {
            EncodedValue::Bytes(bytes) => Self::Bytes(bytes),
            EncodedValue::String(value) => Self::String(value),
            EncodedValue::Int(value) => Self::Int(value),
            EncodedValue::Float(value) => Self::Float(value),
        })
    }
}

/// Named side-data attached to a batch or a single report.
///
/// The backing map allocates nothing until the first annotation is set, so
/// a batch that is never annotated stays allocation-free.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    values: HashMap<String, AnnotationValue>,
}

impl Annotations {
    /// Create an empty annotation store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the annotation with the given name, if there is one.
    pub fn get(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.get(name)
    }

    /// Get the annotation with the given name, inserting `default` first
    /// if it is absent.
    pub fn get_or_add(
        &mut self,
        name: &str,
        default: impl Into<AnnotationValue>,
    ) -> &mut AnnotationValue {
        self.values
            .entry(name.to_string())
            .or_insert_with(|| default.into())
    }

    /// Set an annotation, overwriting any existing value under the name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AnnotationValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// A sink that appends written bytes to the `Bytes` annotation with
    /// the given name, creating it on first write. Writes fail if the
    /// existing annotation is not a byte slice.
    pub fn writer(&mut self, name: impl Into<String>) -> AnnotationWriter<'_> {
        AnnotationWriter {
            values: &mut self.values,
            name: name.into(),
        }
    }

    /// Number of annotations in the store.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no annotations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Annotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Opaque values cannot round-trip; they are dropped here.
        let encodable: Vec<_> = self
            .values
            .iter()
            .filter(|(_, value)| value.is_encodable())
            .collect();
        let mut map = serializer.serialize_map(Some(encodable.len()))?;
        for (name, value) in encodable {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Annotations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            values: HashMap::deserialize(deserializer)?,
        })
    }
}

/// Append-only writer over a `Bytes` annotation.
///
/// Returned by [`Annotations::writer`].
pub struct AnnotationWriter<'a> {
    values: &'a mut HashMap<String, AnnotationValue>,
    name: String,
}

impl io::Write for AnnotationWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let value = self
            .values
            .entry(self.name.clone())
            .or_insert_with(|| AnnotationValue::Bytes(Vec::new()));
        match value {
            AnnotationValue::Bytes(bytes) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("annotation `{}` is not a byte slice", self.name),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
