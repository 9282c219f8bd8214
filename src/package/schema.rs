//! Schemas: the closed set of named, typed fields a record may contain.

use crate::error::{ProtocolError, Result};
use crate::package::field::FieldSpec;
use crate::package::record::Record;
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

/// Immutable mapping from field identifier to [`FieldSpec`].
///
/// Built once and shared read-only by every record created from it.
#[derive(Debug)]
pub struct Schema {
    fields: BTreeMap<String, FieldSpec>,
    longest_identifier: usize,
}

impl Schema {
    /// Build a schema. Identifiers must be unique and non-empty.
    pub fn new<I>(fields: I) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        let mut map = BTreeMap::new();
        for field in fields {
            let identifier = field.identifier().to_string();
            // a zero-length identifier would collide with the entry terminator
            if identifier.is_empty() {
                return Err(ProtocolError::ConfigError(
                    "field identifier cannot be empty".to_string(),
                ));
            }
            if map.insert(identifier.clone(), field).is_some() {
                return Err(ProtocolError::ConfigError(format!(
                    "duplicate field identifier: '{identifier}'"
                )));
            }
        }
        let longest_identifier = map.keys().map(String::len).max().unwrap_or(0);
        Ok(Arc::new(Self {
            fields: map,
            longest_identifier,
        }))
    }

    /// Schema with no fields.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            fields: BTreeMap::new(),
            longest_identifier: 0,
        })
    }

    pub fn field(&self, identifier: &str) -> Option<&FieldSpec> {
        self.fields.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.fields.contains_key(identifier)
    }

    /// Fields in identifier order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Byte length of the longest identifier; bounds identifier parsing.
    pub fn longest_identifier(&self) -> usize {
        self.longest_identifier
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields().filter(|f| !f.is_optional())
    }

    /// New empty record bound to this schema.
    pub fn create(self: &Arc<Self>) -> Record {
        Record::new(Arc::clone(self))
    }

    /// Read a complete record from `input`.
    pub fn deserialize<R: Read + ?Sized>(self: &Arc<Self>, input: &mut R) -> Result<Record> {
        Record::decode(Arc::clone(self), input)
    }
}
