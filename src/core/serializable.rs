//! # Tagged Object Protocol
//!
//! Uniform envelope for composite wire types: `tag (8 bytes) || payload`.
//!
//! Writers implement [`Serializable::write_payload`]; the provided
//! [`Serializable::serialize`] prefixes the type's tag. Readers implement
//! [`Deserializable::read_payload`] and call [`Deserializable::deserialize`],
//! which checks the tag first and fails with a framing error on mismatch.
//! Each type decides what decode context it needs (a character limit, the
//! configured [`Limits`](crate::config::Limits), ...).

use crate::core::tag::Tag;
use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::{Read, Write};

/// A value written as its type tag followed by a payload.
pub trait Serializable {
    /// Tag identifying this wire type. Must not be [`Tag::UNSET`].
    const TAG: Tag;

    /// Write the payload without the tag.
    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()>;

    /// Write the tag and then the payload.
    fn serialize<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        checked_tag::<Self>()?.write(output)?;
        self.write_payload(output)
    }

    /// Read the next tag and fail unless it belongs to this type.
    fn expect_tag<R: Read + ?Sized>(input: &mut R) -> Result<()> {
        checked_tag::<Self>()?.expect(input)
    }

    /// Serialize into a freshly allocated buffer.
    fn to_bytes(&self) -> Result<Bytes> {
        let mut writer = BytesMut::new().writer();
        self.serialize(&mut writer)?;
        Ok(writer.into_inner().freeze())
    }
}

/// A tagged value that can be read back.
pub trait Deserializable: Serializable + Sized {
    /// Limits or other parameters the payload decoder needs.
    type Context: ?Sized;

    /// Read the payload that follows an already-checked tag.
    fn read_payload<R: Read + ?Sized>(input: &mut R, ctx: &Self::Context) -> Result<Self>;

    /// Check the tag, then read the payload.
    fn deserialize<R: Read + ?Sized>(input: &mut R, ctx: &Self::Context) -> Result<Self> {
        Self::expect_tag(input)?;
        Self::read_payload(input, ctx)
    }

    /// Decode one value from the start of `data`. Trailing bytes are ignored.
    fn from_bytes(data: &[u8], ctx: &Self::Context) -> Result<Self> {
        let mut reader = data.reader();
        Self::deserialize(&mut reader, ctx)
    }
}

fn checked_tag<T: Serializable + ?Sized>() -> Result<Tag> {
    if T::TAG.is_unset() {
        return Err(ProtocolError::UnsetTag);
    }
    Ok(T::TAG)
}
