//! # Field Type System
//!
//! A closed set of scalar field kinds. Each kind owns a serialized byte
//! ceiling, a check that raw bytes are decodable, a check that a typed value
//! is acceptable, and a symmetric encode/decode pair:
//!
//! | Kind       | Wire bytes                          | Ceiling          |
//! |------------|-------------------------------------|------------------|
//! | `Bytes`    | identity                            | caller-supplied  |
//! | `String`   | UTF-8                               | `max_chars * 4`  |
//! | `Integer`  | 16-byte signed big-endian           | 16               |
//! | `Float`    | 16-byte numerator + 16-byte denominator | 32           |
//! | `UserName` | UTF-8, normalized on decode         | `max_chars * 4`  |
//! | `Color`    | 3 raw bytes (RGB)                   | 3                |
//!
//! Raw validation gates whether decoding is attempted at all. A kind's
//! decoder must only produce values its own value check accepts; a breach is
//! a defect in this module and panics in debug builds.
//!
//! A [`FieldSpec`] may add a [`Constraint`] narrowing the accepted values
//! (e.g. an integer between 1 and 20).

use crate::core::primitives::MAX_UTF8_BYTES_PER_CHAR;
use crate::core::rational::{Rational, RATIONAL_LEN};
use crate::error::{constants, ProtocolError, Result};
use crate::package::username::normalize_user_name;
use std::fmt;

/// Wire width of an integer field
pub const INTEGER_LEN: usize = 16;

/// Wire width of a color field
pub const COLOR_LEN: usize = 3;

/// Extra predicate a field's values must satisfy.
pub type Constraint = fn(&FieldValue) -> bool;

/// A typed value stored in a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bytes(Vec<u8>),
    String(String),
    Integer(i128),
    Float(f64),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bytes(_) => "bytes",
            FieldValue::String(_) => "string",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float value; integers are widened like the float field accepts them.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bytes(b) => write!(f, "{b:02x?}"),
            FieldValue::String(s) => write!(f, "{s:?}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Bytes(value)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(value: &[u8]) -> Self {
        FieldValue::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for FieldValue {
    fn from(value: [u8; N]) -> Self {
        FieldValue::Bytes(value.to_vec())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<i128> for FieldValue {
    fn from(value: i128) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// The codec family of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bytes { max_len: usize },
    String { max_chars: usize },
    Integer,
    Float,
    UserName { max_chars: usize },
    Color,
}

impl FieldKind {
    /// Largest serialized value this kind accepts.
    pub fn byte_limit(&self) -> usize {
        match *self {
            FieldKind::Bytes { max_len } => max_len,
            FieldKind::String { max_chars } | FieldKind::UserName { max_chars } => {
                max_chars.saturating_mul(MAX_UTF8_BYTES_PER_CHAR as usize)
            }
            FieldKind::Integer => INTEGER_LEN,
            FieldKind::Float => RATIONAL_LEN,
            FieldKind::Color => COLOR_LEN,
        }
    }

    /// Whether `raw` can be handed to [`FieldKind::decode`].
    pub fn validate_raw(&self, raw: &[u8]) -> bool {
        if raw.len() > self.byte_limit() {
            return false;
        }
        match *self {
            FieldKind::Bytes { .. } => true,
            FieldKind::String { max_chars } => std::str::from_utf8(raw)
                .map(|s| s.chars().count() <= max_chars)
                .unwrap_or(false),
            FieldKind::UserName { max_chars } => std::str::from_utf8(raw)
                .map(|s| s.chars().count() <= max_chars && normalize_user_name(s).is_some())
                .unwrap_or(false),
            FieldKind::Integer => raw.len() == INTEGER_LEN,
            FieldKind::Float => <&[u8; RATIONAL_LEN]>::try_from(raw)
                .map_or(false, |b| Rational::from_bytes(b).to_encodable_f64().is_ok()),
            FieldKind::Color => raw.len() == COLOR_LEN,
        }
    }

    /// Whether `value` may be stored in a field of this kind.
    pub fn validate_value(&self, value: &FieldValue) -> bool {
        match (*self, value) {
            (FieldKind::Bytes { max_len }, FieldValue::Bytes(b)) => b.len() <= max_len,
            (FieldKind::String { max_chars }, FieldValue::String(s)) => {
                s.chars().count() <= max_chars
            }
            (FieldKind::UserName { max_chars }, FieldValue::String(s)) => {
                s.chars().count() <= max_chars && normalize_user_name(s).is_some()
            }
            (FieldKind::Integer, FieldValue::Integer(_)) => true,
            (FieldKind::Float, FieldValue::Float(f)) => Rational::is_representable(*f),
            (FieldKind::Float, FieldValue::Integer(i)) => Rational::is_representable(*i as f64),
            (FieldKind::Color, FieldValue::Bytes(b)) => b.len() == COLOR_LEN,
            _ => false,
        }
    }

    /// Serialize a value that passed [`FieldKind::validate_value`].
    pub fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        match (*self, value) {
            (FieldKind::Bytes { .. } | FieldKind::Color, FieldValue::Bytes(b)) => Ok(b.clone()),
            (FieldKind::String { .. } | FieldKind::UserName { .. }, FieldValue::String(s)) => {
                Ok(s.as_bytes().to_vec())
            }
            (FieldKind::Integer, FieldValue::Integer(i)) => Ok(i.to_be_bytes().to_vec()),
            (FieldKind::Float, v) => {
                let f = v.as_float().ok_or_else(|| self.type_mismatch(v))?;
                Ok(Rational::from_f64(f)?.to_bytes().to_vec())
            }
            (_, v) => Err(self.type_mismatch(v)),
        }
    }

    /// Deserialize raw field bytes. Input that fails
    /// [`FieldKind::validate_raw`] is rejected with a validation error.
    pub fn decode(&self, raw: &[u8]) -> Result<FieldValue> {
        if !self.validate_raw(raw) {
            return Err(ProtocolError::validation(format!(
                "{} raw bytes are not a legal {self:?} value",
                raw.len()
            )));
        }
        let value = match *self {
            FieldKind::Bytes { .. } | FieldKind::Color => FieldValue::Bytes(raw.to_vec()),
            FieldKind::String { .. } => FieldValue::String(decode_utf8(raw)?),
            FieldKind::UserName { .. } => {
                let name = normalize_user_name(&decode_utf8(raw)?)
                    .ok_or_else(|| ProtocolError::validation(constants::ERR_USER_NAME_TOO_SHORT))?;
                FieldValue::String(name)
            }
            FieldKind::Integer => {
                let bytes = <[u8; INTEGER_LEN]>::try_from(raw).map_err(|_| {
                    ProtocolError::validation(format!(
                        "integer field needs {INTEGER_LEN} bytes, got {}",
                        raw.len()
                    ))
                })?;
                FieldValue::Integer(i128::from_be_bytes(bytes))
            }
            FieldKind::Float => {
                let bytes = <&[u8; RATIONAL_LEN]>::try_from(raw).map_err(|_| {
                    ProtocolError::validation(format!(
                        "float field needs {RATIONAL_LEN} bytes, got {}",
                        raw.len()
                    ))
                })?;
                FieldValue::Float(Rational::from_bytes(bytes).to_encodable_f64()?)
            }
        };

        debug_assert!(
            self.validate_value(&value),
            "decoder of {self:?} produced a value its own validator rejects"
        );
        Ok(value)
    }

    fn type_mismatch(&self, value: &FieldValue) -> ProtocolError {
        ProtocolError::validation(format!(
            "cannot encode a {} value as {self:?}",
            value.type_name()
        ))
    }
}

fn decode_utf8(raw: &[u8]) -> Result<String> {
    String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::validation(constants::ERR_INVALID_UTF8))
}

/// A named field of a schema.
#[derive(Clone)]
pub struct FieldSpec {
    identifier: String,
    kind: FieldKind,
    optional: bool,
    constraint: Option<Constraint>,
}

impl FieldSpec {
    pub fn new(identifier: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            optional: false,
            constraint: None,
        }
    }

    pub fn bytes(identifier: impl Into<String>, max_len: usize) -> Self {
        Self::new(identifier, FieldKind::Bytes { max_len })
    }

    pub fn string(identifier: impl Into<String>, max_chars: usize) -> Self {
        Self::new(identifier, FieldKind::String { max_chars })
    }

    pub fn integer(identifier: impl Into<String>) -> Self {
        Self::new(identifier, FieldKind::Integer)
    }

    pub fn float(identifier: impl Into<String>) -> Self {
        Self::new(identifier, FieldKind::Float)
    }

    pub fn user_name(identifier: impl Into<String>, max_chars: usize) -> Self {
        Self::new(identifier, FieldKind::UserName { max_chars })
    }

    pub fn color(identifier: impl Into<String>) -> Self {
        Self::new(identifier, FieldKind::Color)
    }

    /// Mark the field as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Narrow the accepted values with an extra predicate.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn byte_limit(&self) -> usize {
        self.kind.byte_limit()
    }

    pub fn validate_raw(&self, raw: &[u8]) -> bool {
        self.kind.validate_raw(raw)
    }

    pub fn validate_value(&self, value: &FieldValue) -> bool {
        self.kind.validate_value(value) && self.constraint.map_or(true, |check| check(value))
    }

    pub fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        self.kind.encode(value)
    }

    /// Decode raw bytes and apply the field's constraint.
    pub fn decode(&self, raw: &[u8]) -> Result<FieldValue> {
        let value = self.kind.decode(raw)?;
        if let Some(check) = self.constraint {
            if !check(&value) {
                return Err(ProtocolError::validation(format!(
                    "value {value} rejected by field '{}'",
                    self.identifier
                )));
            }
        }
        Ok(value)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("constrained", &self.constraint.is_some())
            .finish()
    }
}
