//! # Composite Codecs
//!
//! Tagged wire forms of the primitive values the domain types are built
//! from. Every decoder checks its declared length or count against the
//! caller's limit before reading the body, so an oversized prefix is rejected
//! even when the stream holds no further bytes.
//!
//! ```text
//! UUID    [tag(8)] [bytes(16)]
//! String  [tag(8)] [len(8)] [UTF-8(len)]
//! Float   [tag(8)] [numerator(16)] [denominator(16)]
//! List    [tag(8)] [count(8)] [element]*count
//! ```

use crate::core::exact::{read_bounded_len, read_exact, read_into_exact, read_u64};
use crate::core::rational::{Rational, RATIONAL_LEN};
use crate::core::serializable::{Deserializable, Serializable};
use crate::core::tag::{tags, Tag};
use crate::error::{constants, ProtocolError, Result};
use std::io::{Read, Write};
use uuid::Uuid;

/// Worst-case UTF-8 bytes per character
pub const MAX_UTF8_BYTES_PER_CHAR: u64 = 4;

/// Upper bound on capacity reserved from a decoded count; larger sequences
/// grow as their elements arrive.
pub(crate) const MAX_PREALLOCATED_ITEMS: usize = 1024;

pub(crate) fn write_u64<W: Write + ?Sized>(output: &mut W, value: u64) -> Result<()> {
    output.write_all(&value.to_be_bytes())?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireUuid(pub Uuid);

impl Serializable for WireUuid {
    const TAG: Tag = tags::UUID;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        output.write_all(self.0.as_bytes())?;
        Ok(())
    }
}

impl Deserializable for WireUuid {
    type Context = ();

    fn read_payload<R: Read + ?Sized>(input: &mut R, _ctx: &()) -> Result<Self> {
        let mut bytes = [0u8; 16];
        read_into_exact(input, &mut bytes)?;
        Ok(WireUuid(Uuid::from_bytes(bytes)))
    }
}

/// Length-prefixed UTF-8 string. Decoding takes the maximum character count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WireString(pub String);

impl WireString {
    /// Decode a string payload without reading a tag.
    pub fn read_body<R: Read + ?Sized>(input: &mut R, max_chars: usize) -> Result<String> {
        let limit = (max_chars as u64).saturating_mul(MAX_UTF8_BYTES_PER_CHAR);
        let len = read_bounded_len(input, limit)?;
        let bytes = read_exact(input, len)?;
        let value =
            String::from_utf8(bytes).map_err(|_| ProtocolError::framing(constants::ERR_INVALID_UTF8))?;
        if value.chars().count() > max_chars {
            return Err(ProtocolError::framing(constants::ERR_STRING_TOO_LONG));
        }
        Ok(value)
    }

    pub fn write_body<W: Write + ?Sized>(output: &mut W, value: &str) -> Result<()> {
        write_u64(output, value.len() as u64)?;
        output.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Write a tagged string from a borrowed value.
    pub fn serialize_str<W: Write + ?Sized>(output: &mut W, value: &str) -> Result<()> {
        Self::TAG.write(output)?;
        Self::write_body(output, value)
    }
}

impl Serializable for WireString {
    const TAG: Tag = tags::STRING;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        WireString::write_body(output, &self.0)
    }
}

impl Deserializable for WireString {
    type Context = usize;

    fn read_payload<R: Read + ?Sized>(input: &mut R, max_chars: &usize) -> Result<Self> {
        WireString::read_body(input, *max_chars).map(WireString)
    }
}

/// Float carried as an exact rational. See [`crate::core::rational`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireFloat(pub f64);

impl Serializable for WireFloat {
    const TAG: Tag = tags::FLOAT;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        let rational = Rational::from_f64(self.0)?;
        output.write_all(&rational.to_bytes())?;
        Ok(())
    }
}

impl Deserializable for WireFloat {
    type Context = ();

    fn read_payload<R: Read + ?Sized>(input: &mut R, _ctx: &()) -> Result<Self> {
        let mut bytes = [0u8; RATIONAL_LEN];
        read_into_exact(input, &mut bytes)?;
        Rational::from_bytes(&bytes).to_encodable_f64().map(WireFloat)
    }
}

/// Count-prefixed sequence of tagged elements.
#[derive(Debug, Clone, PartialEq)]
pub struct WireList<T>(pub Vec<T>);

impl<T> Default for WireList<T> {
    fn default() -> Self {
        WireList(Vec::new())
    }
}

impl<T> WireList<T> {
    /// Decode a list whose elements are read by `decode_element`.
    ///
    /// The count is checked against `max_size` before any element is read;
    /// this is the only bound on the memory a hostile list can claim.
    pub fn deserialize_with<R, F>(input: &mut R, max_size: usize, mut decode_element: F) -> Result<Self>
    where
        R: Read + ?Sized,
        F: FnMut(&mut R) -> Result<T>,
    {
        tags::LIST.expect(input)?;
        let count = read_u64(input)?;
        if count > max_size as u64 {
            return Err(ProtocolError::framing(format!(
                "{}: {count} > {max_size}",
                constants::ERR_LIST_TOO_LONG
            )));
        }
        let count = count as usize;
        let mut items = Vec::with_capacity(count.min(MAX_PREALLOCATED_ITEMS));
        for _ in 0..count {
            items.push(decode_element(input)?);
        }
        Ok(WireList(items))
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T: Serializable> WireList<T> {
    /// Write a list from borrowed elements.
    pub fn write_items<'a, W, I>(output: &mut W, items: I) -> Result<()>
    where
        T: 'a,
        W: Write + ?Sized,
        I: ExactSizeIterator<Item = &'a T>,
    {
        tags::LIST.write(output)?;
        write_u64(output, items.len() as u64)?;
        for item in items {
            item.serialize(output)?;
        }
        Ok(())
    }
}

impl<T: Serializable> Serializable for WireList<T> {
    const TAG: Tag = tags::LIST;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        write_u64(output, self.0.len() as u64)?;
        for item in &self.0 {
            item.serialize(output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_uuid_roundtrip() {
        let id = Uuid::new_v4();
        let bytes = WireUuid(id).to_bytes().unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(WireUuid::from_bytes(&bytes, &()).unwrap().0, id);
    }

    #[test]
    fn test_uuid_short_input() {
        let mut bytes = tags::UUID.to_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 15]);
        assert_eq!(
            WireUuid::from_bytes(&bytes, &()).unwrap_err().kind(),
            ErrorKind::EndOfStream
        );
    }

    #[test]
    fn test_string_limits() {
        let value = "This is a test.";
        let bytes = WireString(value.to_string()).to_bytes().unwrap();
        let n = value.chars().count();

        assert_eq!(WireString::from_bytes(&bytes, &n).unwrap().0, value);
        assert_eq!(WireString::from_bytes(&bytes, &(n + 1)).unwrap().0, value);
        assert_eq!(
            WireString::from_bytes(&bytes, &(n - 1)).unwrap_err().kind(),
            ErrorKind::Framing
        );
    }

    #[test]
    fn test_string_multibyte_within_limit() {
        let value = "héllo ✓ 🚀";
        let bytes = WireString(value.to_string()).to_bytes().unwrap();
        let n = value.chars().count();
        assert_eq!(WireString::from_bytes(&bytes, &n).unwrap().0, value);
    }

    #[test]
    fn test_string_invalid_utf8() {
        let mut bytes = tags::STRING.to_bytes().to_vec();
        bytes.extend_from_slice(&2u64.to_be_bytes());
        bytes.extend_from_slice(&[0xC3, 0x28]);
        assert!(matches!(
            WireString::from_bytes(&bytes, &10),
            Err(ProtocolError::Framing(_))
        ));
    }

    #[test]
    fn test_string_oversized_prefix_without_body() {
        let mut bytes = tags::STRING.to_bytes().to_vec();
        bytes.extend_from_slice(&41u64.to_be_bytes());
        assert!(matches!(
            WireString::from_bytes(&bytes, &10),
            Err(ProtocolError::OversizedLength {
                length: 41,
                limit: 40
            })
        ));
    }

    #[test]
    fn test_float_roundtrip_and_specials() {
        let value = 752.442 / 56.063;
        let bytes = WireFloat(value).to_bytes().unwrap();
        assert_eq!(bytes.len(), 8 + 32);
        assert_eq!(WireFloat::from_bytes(&bytes, &()).unwrap().0, value);

        for special in [f64::INFINITY, f64::NEG_INFINITY] {
            let bytes = WireFloat(special).to_bytes().unwrap();
            assert_eq!(WireFloat::from_bytes(&bytes, &()).unwrap().0, special);
        }
        let bytes = WireFloat(f64::NAN).to_bytes().unwrap();
        assert!(WireFloat::from_bytes(&bytes, &()).unwrap().0.is_nan());
    }

    #[test]
    fn test_float_unrepresentable_write_fails() {
        let mut out = Vec::new();
        assert!(matches!(
            WireFloat(f64::MAX).serialize(&mut out),
            Err(ProtocolError::Validation(_))
        ));
    }

    #[test]
    fn test_float_read_rejects_pair_that_cannot_be_rewritten() {
        let mut bytes = tags::FLOAT.to_bytes().to_vec();
        bytes.extend_from_slice(&1i128.to_be_bytes());
        bytes.extend_from_slice(&u128::MAX.to_be_bytes());
        assert_eq!(
            WireFloat::from_bytes(&bytes, &()).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_list_capacity_not_taken_from_count() {
        let mut bytes = tags::LIST.to_bytes().to_vec();
        bytes.extend_from_slice(&(u32::MAX as u64).to_be_bytes());
        let result = WireList::deserialize_with(&mut bytes.as_slice(), usize::MAX, |r| {
            WireUuid::deserialize(r, &())
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::EndOfStream);
    }

    #[test]
    fn test_list_roundtrip() {
        let ids = vec![WireUuid(Uuid::new_v4()), WireUuid(Uuid::new_v4())];
        let bytes = WireList(ids.clone()).to_bytes().unwrap();
        let decoded =
            WireList::deserialize_with(&mut bytes.as_ref(), 10, |r| WireUuid::deserialize(r, &()))
                .unwrap();
        assert_eq!(decoded.0, ids);
    }

    #[test]
    fn test_list_count_checked_before_elements() {
        let mut bytes = tags::LIST.to_bytes().to_vec();
        bytes.extend_from_slice(&2u64.to_be_bytes());
        let mut calls = 0;
        let result = WireList::deserialize_with(&mut bytes.as_slice(), 1, |r| {
            calls += 1;
            WireUuid::deserialize(r, &())
        });
        assert!(matches!(result, Err(ProtocolError::Framing(_))));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_write_items_matches_owned_list() {
        let ids = vec![WireUuid(Uuid::nil()), WireUuid(Uuid::from_bytes([0xFF; 16]))];
        let mut borrowed = Vec::new();
        WireList::write_items(&mut borrowed, ids.iter()).unwrap();
        assert_eq!(borrowed, WireList(ids).to_bytes().unwrap().to_vec());
    }
}
