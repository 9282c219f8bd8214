//! # Core Wire Components
//!
//! Low-level framing shared by every record and message type.
//!
//! ## Components
//! - **Exact reads**: fixed-size reads that never return short buffers
//! - **Tags**: 8-byte type identifiers prefixed to tagged objects
//! - **Serializable**: the `tag || payload` envelope
//! - **Rational**: exact numerator/denominator float encoding
//! - **Primitives**: tagged UUID, string, float and list codecs
//!
//! ## Wire Format
//! All integers are big-endian; every length and count is 8 bytes.
//! ```text
//! [Tag(8)] [Payload(N)]
//! ```
//!
//! ## Security
//! - Every length and count prefix is checked against a caller-supplied
//!   ceiling before the body is allocated or read

pub mod exact;
pub mod primitives;
pub mod rational;
pub mod serializable;
pub mod tag;
