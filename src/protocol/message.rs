//! Chat messages.
//!
//! ```text
//! [USER_MESSAGE tag(8)] [User sender] [String message] [Float timestamp]
//! ```

use crate::config::Limits;
use crate::core::primitives::{WireFloat, WireString};
use crate::core::serializable::{Deserializable, Serializable};
use crate::core::tag::{tags, Tag};
use crate::error::Result;
use crate::protocol::user::User;
use std::io::{Read, Write};

/// A message posted by a user. The timestamp is seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMessage {
    pub sender: User,
    pub message: String,
    pub timestamp: f64,
}

impl UserMessage {
    pub fn new(sender: User, message: impl Into<String>, timestamp: f64) -> Self {
        Self {
            sender,
            message: message.into(),
            timestamp,
        }
    }
}

impl Serializable for UserMessage {
    const TAG: Tag = tags::USER_MESSAGE;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        self.sender.serialize(output)?;
        WireString::serialize_str(output, &self.message)?;
        WireFloat(self.timestamp).serialize(output)
    }
}

impl Deserializable for UserMessage {
    type Context = Limits;

    fn read_payload<R: Read + ?Sized>(input: &mut R, limits: &Limits) -> Result<Self> {
        let sender = User::deserialize(input, limits)?;
        let WireString(message) = WireString::deserialize(input, &limits.max_message_length)?;
        let WireFloat(timestamp) = WireFloat::deserialize(input, &())?;
        Ok(Self {
            sender,
            message,
            timestamp,
        })
    }
}
