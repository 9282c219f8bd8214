//! # LocalChat Protocol
//!
//! Schema-checked binary framing and validation for LocalChat records and
//! messages.
//!
//! The crate sits between raw byte streams and the chat application: it
//! turns streams into typed, validated values and back, and refuses input
//! that is oversized, malformed or out of range before allocating for it.
//!
//! ## Layers
//! - [`core`](crate::core): exact reads, 8-byte type tags, the tagged object envelope and
//!   the primitive codecs (UUID, string, rational float, list)
//! - [`package`]: schemas and records, the unit of structured storage
//! - [`protocol`]: users, messages, chat information, message histories and
//!   chat snapshots
//! - [`config`]: decode limits and logging configuration
//! - [`error`]: the error taxonomy every operation reports through
//!
//! ## Wire Conventions
//! All integers are big-endian. Lengths and counts are 8 bytes. Tagged
//! objects start with their 8-byte tag.
//!
//! ## Example
//! ```rust
//! use localchat_protocol::{options_schema, USER_NAME};
//!
//! let schema = options_schema();
//! let mut options = schema.create();
//! options.set(USER_NAME, "  Ada  Lovelace ")?;
//!
//! let bytes = options.to_bytes()?;
//! let loaded = schema.deserialize(&mut bytes.as_ref())?;
//! assert_eq!(loaded.get_str(USER_NAME), Some("Ada Lovelace"));
//! # Ok::<(), localchat_protocol::ProtocolError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod package;
pub mod protocol;
pub mod utils;

pub use config::{Limits, LoggingConfig, ProtocolConfig};
pub use crate::core::serializable::{Deserializable, Serializable};
pub use crate::core::tag::Tag;
pub use error::{ErrorKind, ProtocolError, Result};
pub use package::{
    options_schema, Change, FieldKind, FieldSpec, FieldValue, ObservedRecord, Record, Schema,
    USER_NAME, USER_NAME_COLOR,
};
pub use protocol::{
    Chat, ChatEnvelope, ChatInformation, ChatSerializationMethod, Csm25122901, MethodRegistry,
    User, UserMessage, UserMessageHistory,
};
pub use utils::init_logging;
