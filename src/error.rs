//! # Error Types
//!
//! Error handling for the framing and validation layer.
//!
//! Every codec, record and configuration operation reports failure through
//! [`ProtocolError`]. Nothing in this crate retries: an error unwinds to the
//! caller, and a [`Record`](crate::package::Record) that was being decoded is
//! left exactly as it was before the call.
//!
//! ## Error Categories
//! - **Stream errors**: the underlying reader or writer failed, or was left in
//!   non-blocking mode
//! - **End of stream**: the input ended before a fixed-size read completed
//! - **Framing errors**: malformed, oversized or duplicate wire structure,
//!   wrong tags, unsupported format versions
//! - **Validation errors**: well-framed bytes that decode to a value the
//!   schema rejects
//! - **Usage errors**: bad arguments on direct record mutation
//!
//! ## Example Usage
//! ```rust
//! use localchat_protocol::core::primitives::WireString;
//! use localchat_protocol::core::serializable::Deserializable;
//! use localchat_protocol::error::ErrorKind;
//!
//! let err = WireString::from_bytes(&[0u8; 4], &16).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::EndOfStream);
//! ```

use crate::core::tag::Tag;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Stream errors
    pub const ERR_NON_BLOCKING_STREAM: &str = "input stream must not be in non-blocking mode";

    /// Framing errors
    pub const ERR_INVALID_UTF8: &str = "string payload is not valid UTF-8";
    pub const ERR_STRING_TOO_LONG: &str = "string exceeds its character limit";
    pub const ERR_LIST_TOO_LONG: &str = "list element count exceeds its limit";
    pub const ERR_INVALID_FLOAT: &str = "float payload is not a valid value";
    pub const ERR_IDENTIFIER_TOO_LARGE: &str = "field identifier is too large";
    pub const ERR_IDENTIFIER_UTF8: &str = "field identifier contains invalid unicode";
    pub const ERR_SENDER_INDEX: &str = "invalid message sender index";
    pub const ERR_MESSAGE_COUNT: &str = "message count exceeds its limit";

    /// Validation errors
    pub const ERR_FLOAT_UNREPRESENTABLE: &str =
        "float cannot be represented as a 128-bit rational";
    pub const ERR_USER_NAME_TOO_SHORT: &str = "normalized user name is shorter than 2 characters";

    /// Logging setup
    pub const ERR_LOGGING_INITIALIZED: &str = "a global tracing subscriber is already installed";
}

/// Coarse classification of a [`ProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed, oversized or duplicate wire structure
    Framing,
    /// Well-framed input the schema rejects
    Validation,
    /// Input ended before a fixed-size read completed
    EndOfStream,
    /// The stream itself failed
    Stream,
    /// Programmer error on direct record use or tag construction
    Usage,
    /// Configuration could not be loaded or is invalid
    Config,
}

// ProtocolError is the primary error type for all codec operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Unexpected end of stream")]
    UnexpectedEof,

    #[error("Framing error: {0}")]
    Framing(String),

    #[error("Incorrect tag: expected {expected}, found {found:#018x}")]
    TagMismatch { expected: Tag, found: i64 },

    #[error("Unsupported binary format version: {0:#06x}")]
    UnsupportedVersion(u16),

    #[error("Length {length} exceeds limit of {limit}")]
    OversizedLength { length: u64, limit: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown package field: '{0}'")]
    UnknownField(String),

    #[error("Invalid value for package field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Package field not present: '{0}'")]
    MissingKey(String),

    #[error("Package is missing non-optional field '{0}'")]
    IncompleteRecord(String),

    #[error("Tag value {0} does not fit in 8 signed bytes")]
    TagOutOfRange(i128),

    #[error("Tag must be assigned by the concrete wire type")]
    UnsetTag,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Classify this error according to the layer's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::Io(_) | ProtocolError::Stream(_) => ErrorKind::Stream,
            ProtocolError::UnexpectedEof => ErrorKind::EndOfStream,
            ProtocolError::Framing(_)
            | ProtocolError::TagMismatch { .. }
            | ProtocolError::UnsupportedVersion(_)
            | ProtocolError::OversizedLength { .. } => ErrorKind::Framing,
            ProtocolError::Validation(_) => ErrorKind::Validation,
            ProtocolError::UnknownField(_)
            | ProtocolError::InvalidValue { .. }
            | ProtocolError::MissingKey(_)
            | ProtocolError::IncompleteRecord(_)
            | ProtocolError::TagOutOfRange(_)
            | ProtocolError::UnsetTag => ErrorKind::Usage,
            ProtocolError::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// True for errors caused by the bytes being decoded rather than the
    /// stream or the caller.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self.kind(), ErrorKind::Framing | ErrorKind::Validation)
    }

    pub(crate) fn framing(msg: impl Into<String>) -> Self {
        ProtocolError::Framing(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ProtocolError::Validation(msg.into())
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ProtocolError::UnexpectedEof.kind(), ErrorKind::EndOfStream);
        assert_eq!(
            ProtocolError::OversizedLength { length: 9, limit: 8 }.kind(),
            ErrorKind::Framing
        );
        assert_eq!(
            ProtocolError::UnknownField("x".into()).kind(),
            ErrorKind::Usage
        );
        assert_eq!(
            ProtocolError::Io(io::Error::new(io::ErrorKind::Other, "boom")).kind(),
            ErrorKind::Stream
        );
    }

    #[test]
    fn test_malformed_input_classification() {
        assert!(ProtocolError::validation("bad").is_malformed_input());
        assert!(ProtocolError::UnsupportedVersion(2).is_malformed_input());
        assert!(!ProtocolError::UnexpectedEof.is_malformed_input());
        assert!(!ProtocolError::MissingKey("k".into()).is_malformed_input());
    }

    #[test]
    fn test_display_messages() {
        let err = ProtocolError::OversizedLength {
            length: 20,
            limit: 16,
        };
        assert_eq!(err.to_string(), "Length 20 exceeds limit of 16");
        assert_eq!(
            ProtocolError::UnsupportedVersion(2).to_string(),
            "Unsupported binary format version: 0x0002"
        );
    }
}
