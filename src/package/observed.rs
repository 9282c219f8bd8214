//! Records whose mutations report what changed.
//!
//! A persisted record (for example the options file) has to be rewritten
//! whenever it changes. Instead of firing a stored callback, every mutating
//! call on [`ObservedRecord`] returns a [`Change`] the caller hands to its
//! persistence layer. Callers sharing an observed record across threads must
//! hold their own lock across the mutation and the handling of its change.

use crate::error::Result;
use crate::package::field::FieldValue;
use crate::package::record::Record;
use crate::package::schema::Schema;
use std::io::Read;
use std::sync::Arc;

/// What a successful mutation did to an [`ObservedRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A field was assigned
    Set { field: String },
    /// A field was removed
    Deleted { field: String },
    /// The whole contents were replaced
    Replaced,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObservedRecord {
    inner: Record,
}

impl ObservedRecord {
    pub fn new(record: Record) -> Self {
        Self { inner: record }
    }

    /// Empty observed record bound to `schema`.
    pub fn with_schema(schema: &Arc<Schema>) -> Self {
        Self::new(schema.create())
    }

    /// Read-only view of the wrapped record.
    pub fn record(&self) -> &Record {
        &self.inner
    }

    pub fn into_inner(self) -> Record {
        self.inner
    }

    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<Change> {
        self.inner.set(key, value)?;
        Ok(Change::Set {
            field: key.to_string(),
        })
    }

    pub fn delete(&mut self, key: &str) -> Result<Change> {
        self.inner.delete(key)?;
        Ok(Change::Deleted {
            field: key.to_string(),
        })
    }

    /// Swap in `record`, returning the previous contents.
    pub fn replace(&mut self, record: Record) -> (Record, Change) {
        (std::mem::replace(&mut self.inner, record), Change::Replaced)
    }

    /// Replace the contents from `input`. No change is reported on failure,
    /// and the contents are left as they were.
    pub fn deserialize<R: Read + ?Sized>(&mut self, input: &mut R) -> Result<Change> {
        self.inner.deserialize(input)?;
        Ok(Change::Replaced)
    }
}

impl From<Record> for ObservedRecord {
    fn from(record: Record) -> Self {
        Self::new(record)
    }
}
