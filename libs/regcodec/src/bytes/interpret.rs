//! Numeric interpretation of register payloads
//!
//! Reads a byte slice of the exact format width as an integer or IEEE-754 bit
//! pattern in the requested endianness and widens the result to `f64`. Every
//! bit pattern is a valid input; NaN and infinities come back as values.

use super::DataFormat;
use crate::error::{DecodeError, Result};

/// Borrow `bytes` as a fixed-size array, failing on any other length
#[inline]
pub(crate) fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| DecodeError::length_mismatch(N, bytes.len()))
}

/// Interpret `bytes` as `format`
///
/// `big_endian` selects most-significant-byte-first reads; otherwise the
/// least significant byte comes first. The slice length must equal
/// `format.byte_width()`.
pub fn interpret(bytes: &[u8], format: DataFormat, big_endian: bool) -> Result<f64> {
    let expected = format.byte_width();
    if bytes.len() != expected {
        return Err(DecodeError::length_mismatch(expected, bytes.len()));
    }

    let value = match format {
        DataFormat::Int16 => {
            let raw = fixed::<2>(bytes)?;
            f64::from(if big_endian {
                i16::from_be_bytes(raw)
            } else {
                i16::from_le_bytes(raw)
            })
        },
        DataFormat::UInt16 => {
            let raw = fixed::<2>(bytes)?;
            f64::from(if big_endian {
                u16::from_be_bytes(raw)
            } else {
                u16::from_le_bytes(raw)
            })
        },
        DataFormat::Int32 => {
            let raw = fixed::<4>(bytes)?;
            f64::from(if big_endian {
                i32::from_be_bytes(raw)
            } else {
                i32::from_le_bytes(raw)
            })
        },
        DataFormat::UInt32 => {
            let raw = fixed::<4>(bytes)?;
            f64::from(if big_endian {
                u32::from_be_bytes(raw)
            } else {
                u32::from_le_bytes(raw)
            })
        },
        DataFormat::Float32 => {
            let raw = fixed::<4>(bytes)?;
            f64::from(if big_endian {
                f32::from_be_bytes(raw)
            } else {
                f32::from_le_bytes(raw)
            })
        },
        DataFormat::Float64 => {
            let raw = fixed::<8>(bytes)?;
            if big_endian {
                f64::from_be_bytes(raw)
            } else {
                f64::from_le_bytes(raw)
            }
        },
    };

    Ok(value)
}
