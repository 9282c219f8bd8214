//! Chat identity.
//!
//! ```text
//! [CHAT_INFORMATION tag(8)] [UUID] [String name]
//! ```

use crate::config::Limits;
use crate::core::primitives::{WireString, WireUuid};
use crate::core::serializable::{Deserializable, Serializable};
use crate::core::tag::{tags, Tag};
use crate::error::Result;
use std::io::{Read, Write};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatInformation {
    pub id: Uuid,
    pub name: String,
}

impl ChatInformation {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Serializable for ChatInformation {
    const TAG: Tag = tags::CHAT_INFORMATION;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        WireUuid(self.id).serialize(output)?;
        WireString::serialize_str(output, &self.name)
    }
}

impl Deserializable for ChatInformation {
    type Context = Limits;

    fn read_payload<R: Read + ?Sized>(input: &mut R, limits: &Limits) -> Result<Self> {
        let WireUuid(id) = WireUuid::deserialize(input, &())?;
        let WireString(name) = WireString::deserialize(input, &limits.max_chat_name_length)?;
        Ok(Self { id, name })
    }
}
