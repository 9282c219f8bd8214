//! Chat participants.
//!
//! ```text
//! [USER tag(8)] [UUID] [String name]
//! ```

use crate::config::Limits;
use crate::core::primitives::{WireString, WireUuid};
use crate::core::serializable::{Deserializable, Serializable};
use crate::core::tag::{tags, Tag};
use crate::error::Result;
use std::io::{Read, Write};
use uuid::Uuid;

/// A chat participant as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

impl User {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// User with a freshly generated id.
    pub fn random(name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), name)
    }
}

impl Serializable for User {
    const TAG: Tag = tags::USER;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        WireUuid(self.id).serialize(output)?;
        WireString::serialize_str(output, &self.name)
    }
}

impl Deserializable for User {
    type Context = Limits;

    fn read_payload<R: Read + ?Sized>(input: &mut R, limits: &Limits) -> Result<Self> {
        let WireUuid(id) = WireUuid::deserialize(input, &())?;
        let WireString(name) = WireString::deserialize(input, &limits.max_user_name_length)?;
        Ok(Self { id, name })
    }
}
