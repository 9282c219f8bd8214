//! # Records
//!
//! A schema-bound, validated key/value container. Every assignment is
//! checked against the field's value validator, and a record can only be
//! written once every non-optional field is present.
//!
//! ## Wire Format
//! ```text
//! ([KeyLen(8)] [Key(UTF-8)] [ValueLen(8)] [Value])*  [0(8)]
//! ```
//! Entries are written in identifier order, so equal records encode to
//! identical bytes.
//!
//! Decoding builds a fresh record and only hands it out once the whole
//! input has been accepted; [`Record::deserialize`] replaces `self` on
//! success and leaves it untouched on any failure.

use crate::core::exact::{read_bounded_len, read_exact, read_u64};
use crate::core::primitives::write_u64;
use crate::error::{constants, ProtocolError, Result};
use crate::package::field::{FieldKind, FieldValue};
use crate::package::schema::Schema;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    data: BTreeMap<String, FieldValue>,
}

impl Record {
    pub(crate) fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            data: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Present field identifiers in identifier order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        self.get(key).and_then(FieldValue::as_bytes)
    }

    pub fn get_integer(&self, key: &str) -> Option<i128> {
        self.get(key).and_then(FieldValue::as_integer)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_float)
    }

    /// Assign a field, returning the value it replaced.
    ///
    /// # Errors
    /// - `ProtocolError::UnknownField` if the schema has no field `key`
    /// - `ProtocolError::InvalidValue` if the field rejects `value`
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<Option<FieldValue>> {
        let field = self
            .schema
            .field(key)
            .ok_or_else(|| ProtocolError::UnknownField(key.to_string()))?;
        let value = value.into();
        if !field.validate_value(&value) {
            return Err(ProtocolError::InvalidValue {
                field: key.to_string(),
                reason: format!("{value} is not a legal {:?} value", field.kind()),
            });
        }
        // float fields accept integers; store what a decode would produce
        let value = match (field.kind(), value) {
            (FieldKind::Float, FieldValue::Integer(i)) => FieldValue::Float(i as f64),
            (_, value) => value,
        };
        Ok(self.data.insert(key.to_string(), value))
    }

    /// Remove a field, returning its value.
    ///
    /// # Errors
    /// Returns `ProtocolError::MissingKey` if the field is not present.
    pub fn delete(&mut self, key: &str) -> Result<FieldValue> {
        self.data
            .remove(key)
            .ok_or_else(|| ProtocolError::MissingKey(key.to_string()))
    }

    /// Non-optional schema fields that are not present.
    pub fn missing_fields(&self) -> impl Iterator<Item = &str> {
        self.schema
            .required_fields()
            .map(|f| f.identifier())
            .filter(|id| !self.data.contains_key(*id))
    }

    /// Whether every non-optional field is present.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().next().is_none()
    }

    /// Write the record.
    ///
    /// # Errors
    /// Returns `ProtocolError::IncompleteRecord` (writing nothing) if a
    /// non-optional field is absent; callers are expected to check
    /// [`Record::is_complete`] first.
    pub fn serialize<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        if let Some(missing) = self.missing_fields().next() {
            return Err(ProtocolError::IncompleteRecord(missing.to_string()));
        }

        for (key, value) in &self.data {
            let field = self
                .schema
                .field(key)
                .ok_or_else(|| ProtocolError::UnknownField(key.clone()))?;
            let value_bytes = field.encode(value)?;
            write_u64(output, key.len() as u64)?;
            output.write_all(key.as_bytes())?;
            write_u64(output, value_bytes.len() as u64)?;
            output.write_all(&value_bytes)?;
        }
        write_u64(output, 0)?;
        Ok(())
    }

    /// Serialize into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut writer = BytesMut::new().writer();
        self.serialize(&mut writer)?;
        Ok(writer.into_inner().freeze())
    }

    /// Replace this record's contents with a record read from `input`.
    ///
    /// On any failure the record keeps the fields and values it had before
    /// the call.
    pub fn deserialize<R: Read + ?Sized>(&mut self, input: &mut R) -> Result<()> {
        let decoded = Record::decode(Arc::clone(&self.schema), input)?;
        self.data = decoded.data;
        Ok(())
    }

    #[instrument(skip_all, fields(fields = schema.len()))]
    pub(crate) fn decode<R: Read + ?Sized>(schema: Arc<Schema>, input: &mut R) -> Result<Record> {
        match Record::decode_entries(&schema, input) {
            Ok(data) => {
                debug!(entries = data.len(), "Decoded record");
                Ok(Record { schema, data })
            }
            Err(e) => {
                warn!(error = %e, "Rejected record");
                Err(e)
            }
        }
    }

    fn decode_entries<R: Read + ?Sized>(
        schema: &Schema,
        input: &mut R,
    ) -> Result<BTreeMap<String, FieldValue>> {
        let mut data = BTreeMap::new();
        let max_key_len = schema.longest_identifier() as u64;

        loop {
            let key_len = read_u64(input)?;
            if key_len == 0 {
                break;
            }
            if key_len > max_key_len {
                return Err(ProtocolError::framing(format!(
                    "{}: {key_len} > {max_key_len}",
                    constants::ERR_IDENTIFIER_TOO_LARGE
                )));
            }
            let key_bytes = read_exact(input, key_len as usize)?;
            let key = String::from_utf8(key_bytes)
                .map_err(|_| ProtocolError::framing(constants::ERR_IDENTIFIER_UTF8))?;
            let field = schema.field(&key).ok_or_else(|| {
                ProtocolError::framing(format!("unexpected field identifier: '{key}'"))
            })?;
            if data.contains_key(&key) {
                return Err(ProtocolError::framing(format!(
                    "duplicate field identifier: '{key}'"
                )));
            }

            let value_len = read_bounded_len(input, field.byte_limit() as u64)?;
            let value_bytes = read_exact(input, value_len)?;
            if !field.validate_raw(&value_bytes) {
                return Err(ProtocolError::validation(format!(
                    "value for field '{key}' is illegal"
                )));
            }
            let value = field.decode(&value_bytes)?;
            data.insert(key, value);
        }

        if let Some(missing) = schema
            .required_fields()
            .find(|f| !data.contains_key(f.identifier()))
        {
            return Err(ProtocolError::validation(format!(
                "non-optional field '{}' is missing",
                missing.identifier()
            )));
        }
        Ok(data)
    }
}

/// Records are equal when they share a schema and hold equal values.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.data == other.data
    }
}
