//! # Type Tags
//!
//! Every tagged wire object starts with an 8-byte signed big-endian type tag
//! ("magic number") so a reader can identify a blob before decoding it.
//!
//! The set of tags is closed and known at compile time: each concrete wire
//! type has one constant in [`tags`], and [`tags::ALL`] lists them so the
//! uniqueness of the whole set is checked by a unit test rather than by a
//! process-wide registry.

use crate::core::exact::read_i64;
use crate::error::{ProtocolError, Result};
use std::fmt;
use std::io::{Read, Write};

/// Wire width of a tag in bytes
pub const TAG_LEN: usize = 8;

/// An 8-byte type identifier prefixed to a tagged object's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(i64);

impl Tag {
    /// Placeholder tag of the base protocol. Concrete wire types must not use it.
    pub const UNSET: Tag = Tag(0);

    pub const fn new(value: i64) -> Self {
        Tag(value)
    }

    /// Build a tag from a wider integer, failing if it does not fit in
    /// 8 signed bytes.
    pub fn try_from_wide(value: i128) -> Result<Self> {
        i64::try_from(value)
            .map(Tag)
            .map_err(|_| ProtocolError::TagOutOfRange(value))
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    pub const fn is_unset(self) -> bool {
        self.0 == Tag::UNSET.0
    }

    pub const fn to_bytes(self) -> [u8; TAG_LEN] {
        self.0.to_be_bytes()
    }

    pub fn write<W: Write + ?Sized>(self, output: &mut W) -> Result<()> {
        output.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read whatever tag comes next.
    pub fn read<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        read_i64(input).map(Tag)
    }

    /// Read the next tag and fail unless it is this one.
    pub fn expect<R: Read + ?Sized>(self, input: &mut R) -> Result<()> {
        let found = read_i64(input)?;
        if found != self.0 {
            return Err(ProtocolError::TagMismatch {
                expected: self,
                found,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Every tag used on the wire.
pub mod tags {
    use super::Tag;

    pub const STRING: Tag = Tag::new(0x2025_12_29_c012_4b03);
    pub const FLOAT: Tag = Tag::new(0x2025_12_29_300c_ff10);
    pub const UUID: Tag = Tag::new(0x2025_12_29_1ea0_4992);
    pub const LIST: Tag = Tag::new(0x2025_12_29_18b4_7260);
    pub const USER: Tag = Tag::new(0x2025_12_29_471b_ca16);
    pub const USER_MESSAGE: Tag = Tag::new(0x2025_12_29_0902_29fc);
    pub const CHAT_INFORMATION: Tag = Tag::new(0x2025_12_29_447a_93f0);
    pub const USER_MESSAGE_HISTORY: Tag = Tag::new(0x2025_12_29_4708_002e);
    pub const CHAT_ENVELOPE: Tag = Tag::new(0x2025_12_29_630e_a260);
    pub const CHAT_SNAPSHOT: Tag = Tag::new(0x2025_12_29_ca0e_40b2);

    /// Name and value of every wire tag.
    pub const ALL: &[(&str, Tag)] = &[
        ("STRING", STRING),
        ("FLOAT", FLOAT),
        ("UUID", UUID),
        ("LIST", LIST),
        ("USER", USER),
        ("USER_MESSAGE", USER_MESSAGE),
        ("CHAT_INFORMATION", CHAT_INFORMATION),
        ("USER_MESSAGE_HISTORY", USER_MESSAGE_HISTORY),
        ("CHAT_ENVELOPE", CHAT_ENVELOPE),
        ("CHAT_SNAPSHOT", CHAT_SNAPSHOT),
    ];
}
