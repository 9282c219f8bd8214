//! # Packages
//!
//! Schema-bound records: the unit of structured storage.
//!
//! A [`Schema`] fixes the named, typed fields a [`Record`] may hold. Every
//! assignment is validated by the field's kind, and decoding either yields a
//! complete record or leaves the target untouched.
//!
//! ## Components
//! - **Field**: closed set of field kinds and their codecs
//! - **Username**: display-name normalization
//! - **Schema / Record**: the container and its wire form
//! - **Observed**: records whose mutations return a [`Change`]
//! - **Options**: the stored `{user.name, user.name.color}` schema
//!
//! ## Example
//! ```rust
//! use localchat_protocol::package::{FieldSpec, Schema};
//!
//! let schema = Schema::new([
//!     FieldSpec::integer("between1And20"),
//!     FieldSpec::string("label", 32).optional(),
//! ])?;
//! let mut record = schema.create();
//! record.set("between1And20", 7i32)?;
//!
//! let bytes = record.to_bytes()?;
//! let decoded = schema.deserialize(&mut bytes.as_ref())?;
//! assert_eq!(decoded, record);
//! # Ok::<(), localchat_protocol::error::ProtocolError>(())
//! ```

pub mod field;
pub mod observed;
pub mod options;
pub mod record;
pub mod schema;
pub mod username;

pub use field::{Constraint, FieldKind, FieldSpec, FieldValue};
pub use observed::{Change, ObservedRecord};
pub use options::{options_schema, USER_NAME, USER_NAME_COLOR};
pub use record::Record;
pub use schema::Schema;
pub use username::{is_valid_user_name, normalize_user_name};
