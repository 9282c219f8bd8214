//! # Rational Float Encoding
//!
//! A float is written as two 16-byte big-endian integers: a signed numerator
//! and an unsigned denominator. Finite values are stored as their exact binary
//! fraction, so decoding reproduces the original `f64` bit for bit (up to the
//! sign of zero). Denominator 0 marks the non-finite values:
//!
//! | numerator | value     |
//! |-----------|-----------|
//! | 1         | +Infinity |
//! | 2         | -Infinity |
//! | 3         | NaN       |
//!
//! Any other numerator over a zero denominator is invalid.

use crate::error::{constants, ProtocolError, Result};

/// Wire width of an encoded rational
pub const RATIONAL_LEN: usize = 32;

const POSITIVE_INFINITY: i128 = 1;
const NEGATIVE_INFINITY: i128 = 2;
const NOT_A_NUMBER: i128 = 3;

const MANTISSA_BITS: u32 = 52;
const EXPONENT_BIAS: i32 = 1075;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub numerator: i128,
    pub denominator: u128,
}

impl Rational {
    /// Exact fraction of `value`, or a sentinel pair for non-finite values.
    ///
    /// # Errors
    /// Returns `ProtocolError::Validation` if the exact fraction does not fit
    /// the 16-byte fields (magnitudes from 2^127 up, or fractions needing a
    /// denominator above 2^127).
    pub fn from_f64(value: f64) -> Result<Self> {
        if value.is_nan() {
            return Ok(Rational::special(NOT_A_NUMBER));
        }
        if value.is_infinite() {
            let code = if value > 0.0 {
                POSITIVE_INFINITY
            } else {
                NEGATIVE_INFINITY
            };
            return Ok(Rational::special(code));
        }
        if value == 0.0 {
            return Ok(Rational {
                numerator: 0,
                denominator: 1,
            });
        }

        // value = mantissa * 2^exponent
        let bits = value.to_bits();
        let biased = ((bits >> MANTISSA_BITS) & 0x7FF) as i32;
        let fraction = bits & ((1u64 << MANTISSA_BITS) - 1);
        let (mut mantissa, mut exponent) = if biased == 0 {
            (fraction, 1 - EXPONENT_BIAS)
        } else {
            (fraction | (1u64 << MANTISSA_BITS), biased - EXPONENT_BIAS)
        };

        if exponent < 0 {
            let shift = mantissa.trailing_zeros().min(exponent.unsigned_abs());
            mantissa >>= shift;
            exponent += shift as i32;
        }

        let magnitude = mantissa as i128;
        let (numerator, denominator) = if exponent >= 0 {
            let shift = exponent as u32;
            if shift + (64 - mantissa.leading_zeros()) > 127 {
                return Err(unrepresentable());
            }
            (magnitude << shift, 1u128)
        } else {
            let shift = exponent.unsigned_abs();
            if shift > 127 {
                return Err(unrepresentable());
            }
            (magnitude, 1u128 << shift)
        };

        let numerator = if value.is_sign_negative() {
            -numerator
        } else {
            numerator
        };
        Ok(Rational {
            numerator,
            denominator,
        })
    }

    /// Whether `value` can be encoded without loss.
    pub fn is_representable(value: f64) -> bool {
        Rational::from_f64(value).is_ok()
    }

    pub fn to_f64(self) -> Result<f64> {
        if self.denominator == 0 {
            return match self.numerator {
                POSITIVE_INFINITY => Ok(f64::INFINITY),
                NEGATIVE_INFINITY => Ok(f64::NEG_INFINITY),
                NOT_A_NUMBER => Ok(f64::NAN),
                _ => Err(ProtocolError::framing(constants::ERR_INVALID_FLOAT)),
            };
        }
        Ok(self.numerator as f64 / self.denominator as f64)
    }

    /// Decode a wire pair, rejecting values [`Rational::from_f64`] cannot
    /// write back. Every float decoder in the crate goes through here.
    pub fn to_encodable_f64(self) -> Result<f64> {
        let value = self.to_f64()?;
        if !Rational::is_representable(value) {
            return Err(unrepresentable());
        }
        Ok(value)
    }

    /// Whether this pair decodes to a value.
    pub fn is_valid(self) -> bool {
        self.denominator != 0
            || matches!(
                self.numerator,
                POSITIVE_INFINITY | NEGATIVE_INFINITY | NOT_A_NUMBER
            )
    }

    pub fn to_bytes(self) -> [u8; RATIONAL_LEN] {
        let mut out = [0u8; RATIONAL_LEN];
        out[..16].copy_from_slice(&self.numerator.to_be_bytes());
        out[16..].copy_from_slice(&self.denominator.to_be_bytes());
        out
    }

    /// Split 32 wire bytes into numerator and denominator. No validity check.
    pub fn from_bytes(bytes: &[u8; RATIONAL_LEN]) -> Self {
        let mut numerator = [0u8; 16];
        let mut denominator = [0u8; 16];
        numerator.copy_from_slice(&bytes[..16]);
        denominator.copy_from_slice(&bytes[16..]);
        Rational {
            numerator: i128::from_be_bytes(numerator),
            denominator: u128::from_be_bytes(denominator),
        }
    }

    const fn special(code: i128) -> Self {
        Rational {
            numerator: code,
            denominator: 0,
        }
    }
}

fn unrepresentable() -> ProtocolError {
    ProtocolError::validation(constants::ERR_FLOAT_UNREPRESENTABLE)
}
