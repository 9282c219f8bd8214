//! # Exact Reads
//!
//! Fixed-size reads from a byte stream. A read either yields exactly the
//! requested number of bytes or fails; short buffers are never returned.
//!
//! Bytes consumed before a failure are not pushed back. A stream that
//! reported [`ProtocolError::UnexpectedEof`] must not be reused.

use crate::error::{constants, ProtocolError, Result};
use std::io::{self, Read};

/// Fill `buf` completely from `input`.
///
/// # Errors
/// - `ProtocolError::Stream` if the stream is in non-blocking mode and has no data
/// - `ProtocolError::UnexpectedEof` if the stream ends before `buf` is full
/// - `ProtocolError::Io` for any other I/O failure
pub fn read_into_exact<R: Read + ?Sized>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => return Err(ProtocolError::UnexpectedEof),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                return Err(ProtocolError::Stream(
                    constants::ERR_NON_BLOCKING_STREAM.to_string(),
                ))
            }
            Err(e) => return Err(ProtocolError::Io(e)),
        }
    }
    Ok(())
}

/// Read exactly `n` bytes from `input`.
///
/// `n` must already be bounded by the caller; this allocates `n` bytes up front.
pub fn read_exact<R: Read + ?Sized>(input: &mut R, n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    read_into_exact(input, &mut buf)?;
    Ok(buf)
}

fn read_array<const N: usize, R: Read + ?Sized>(input: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    read_into_exact(input, &mut buf)?;
    Ok(buf)
}

/// Read an unsigned 8-byte big-endian integer (lengths and counts).
pub fn read_u64<R: Read + ?Sized>(input: &mut R) -> Result<u64> {
    read_array::<8, _>(input).map(u64::from_be_bytes)
}

/// Read a signed 8-byte big-endian integer (tags).
pub fn read_i64<R: Read + ?Sized>(input: &mut R) -> Result<i64> {
    read_array::<8, _>(input).map(i64::from_be_bytes)
}

/// Read an unsigned 16-byte big-endian integer.
pub fn read_u128<R: Read + ?Sized>(input: &mut R) -> Result<u128> {
    read_array::<16, _>(input).map(u128::from_be_bytes)
}

/// Read a signed 16-byte big-endian two's-complement integer.
pub fn read_i128<R: Read + ?Sized>(input: &mut R) -> Result<i128> {
    read_array::<16, _>(input).map(i128::from_be_bytes)
}

/// Read a length prefix and reject it before any payload is read if it
/// exceeds `limit`.
pub fn read_bounded_len<R: Read + ?Sized>(input: &mut R, limit: u64) -> Result<usize> {
    let length = read_u64(input)?;
    if length > limit {
        return Err(ProtocolError::OversizedLength { length, limit });
    }
    usize::try_from(length).map_err(|_| ProtocolError::OversizedLength { length, limit })
}
