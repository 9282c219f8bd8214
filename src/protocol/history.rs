//! # Message History
//!
//! A message log in which each distinct sender is written once to a user
//! table and messages refer to it by index.
//!
//! ## Wire Format
//! ```text
//! [USER_MESSAGE_HISTORY tag(8)]
//! [Version(8)]            major in the top 16 bits, minor in the next 16
//! [List<User> table]
//! [MessageCount(8)]
//! ([UserIndex(8)] [String message] [Float timestamp]) * MessageCount
//! ```
//!
//! The user table lists the most recent sender first. Two users are the same
//! table entry only when both id and name match, so a sender that changed
//! names keeps each of its names.
//!
//! ## Security
//! - The table size is bounded by `max_user_count` before any user is read
//! - The message count is bounded by `max_message_count` before any message
//!   is read
//! - Streams whose major version differs from this crate's are rejected

use crate::config::{Limits, HISTORY_FORMAT_MAJOR, HISTORY_FORMAT_MINOR};
use crate::core::exact::read_u64;
use crate::core::primitives::{
    write_u64, WireFloat, WireList, WireString, MAX_PREALLOCATED_ITEMS,
};
use crate::core::serializable::{Deserializable, Serializable};
use crate::core::tag::{tags, Tag};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::message::UserMessage;
use crate::protocol::user::User;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use tracing::{debug, instrument, warn};

/// Format version written by this crate
pub const HISTORY_FORMAT_VERSION: u64 =
    ((HISTORY_FORMAT_MAJOR as u64) << 48) | ((HISTORY_FORMAT_MINOR as u64) << 32);

/// Major component of a packed format version.
pub const fn version_major(version: u64) -> u16 {
    (version >> 48) as u16
}

/// Minor component of a packed format version.
pub const fn version_minor(version: u64) -> u16 {
    (version >> 32) as u16
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserMessageHistory {
    messages: Vec<UserMessage>,
}

impl UserMessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: UserMessage) {
        self.messages.push(message);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[UserMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<UserMessage> {
        self.messages
    }

    /// Distinct senders, most recent first. This is the user table written
    /// to the wire.
    pub fn senders(&self) -> Vec<&User> {
        let mut seen = HashSet::new();
        let mut table = Vec::new();
        for message in self.messages.iter().rev() {
            if seen.insert(&message.sender) {
                table.push(&message.sender);
            }
        }
        table
    }

    fn read_body<R: Read + ?Sized>(input: &mut R, limits: &Limits) -> Result<Self> {
        let version = read_u64(input)?;
        if version_major(version) != HISTORY_FORMAT_MAJOR {
            return Err(ProtocolError::UnsupportedVersion(version_major(version)));
        }

        let users = WireList::deserialize_with(input, limits.max_user_count, |r| {
            User::deserialize(r, limits)
        })?
        .into_inner();

        let count = read_u64(input)?;
        if count > limits.max_message_count as u64 {
            return Err(ProtocolError::framing(format!(
                "{}: {count} > {}",
                constants::ERR_MESSAGE_COUNT,
                limits.max_message_count
            )));
        }

        let mut messages = Vec::with_capacity((count as usize).min(MAX_PREALLOCATED_ITEMS));
        for _ in 0..count {
            let index = read_u64(input)?;
            let sender = usize::try_from(index)
                .ok()
                .and_then(|i| users.get(i))
                .ok_or_else(|| {
                    ProtocolError::framing(format!(
                        "{}: {index} >= {}",
                        constants::ERR_SENDER_INDEX,
                        users.len()
                    ))
                })?;
            let WireString(message) = WireString::deserialize(input, &limits.max_message_length)?;
            let WireFloat(timestamp) = WireFloat::deserialize(input, &())?;
            messages.push(UserMessage::new(sender.clone(), message, timestamp));
        }

        Ok(Self { messages })
    }
}

impl Serializable for UserMessageHistory {
    const TAG: Tag = tags::USER_MESSAGE_HISTORY;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        let table = self.senders();
        let index: HashMap<&User, u64> = table
            .iter()
            .enumerate()
            .map(|(i, user)| (*user, i as u64))
            .collect();

        write_u64(output, HISTORY_FORMAT_VERSION)?;
        WireList::<User>::write_items(output, table.iter().copied())?;
        write_u64(output, self.messages.len() as u64)?;
        for message in &self.messages {
            let sender = index.get(&message.sender).copied().ok_or_else(|| {
                ProtocolError::framing(format!("sender {} missing from user table", message.sender.id))
            })?;
            write_u64(output, sender)?;
            WireString::serialize_str(output, &message.message)?;
            WireFloat(message.timestamp).serialize(output)?;
        }
        Ok(())
    }
}

impl Deserializable for UserMessageHistory {
    type Context = Limits;

    #[instrument(skip_all)]
    fn read_payload<R: Read + ?Sized>(input: &mut R, limits: &Limits) -> Result<Self> {
        match Self::read_body(input, limits) {
            Ok(history) => {
                debug!(messages = history.len(), "Decoded message history");
                Ok(history)
            }
            Err(e) => {
                warn!(error = %e, "Rejected message history");
                Err(e)
            }
        }
    }
}

impl From<Vec<UserMessage>> for UserMessageHistory {
    fn from(messages: Vec<UserMessage>) -> Self {
        Self { messages }
    }
}

impl FromIterator<UserMessage> for UserMessageHistory {
    fn from_iter<I: IntoIterator<Item = UserMessage>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a UserMessageHistory {
    type Item = &'a UserMessage;
    type IntoIter = std::slice::Iter<'a, UserMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
