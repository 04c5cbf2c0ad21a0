//! Value to register payload conversion
//!
//! The inverse of decoding: renders a value in a format's canonical
//! big/little-endian form and applies the pair swap of the order. Also
//! converts between 16-bit register words and wire bytes.

use super::permute::permute_in_place;
use super::{ByteOrder, DataFormat};
use crate::error::{DecodeError, Result};

/// Check that `value` is an integer representable in `[min, max]`
fn checked_integer(value: f64, format: DataFormat, min: f64, max: f64) -> Result<f64> {
    if !value.is_finite() || value.fract() != 0.0 || value < min || value > max {
        return Err(DecodeError::ValueOutOfRange { format, value });
    }
    Ok(value)
}

/// Encode `value` as `format` bytes laid out in `order`
///
/// Integer formats reject non-finite, fractional and out-of-range values.
/// `Float32` narrows with IEEE rounding; values beyond `f32::MAX` become
/// infinities, as any PLC would store them.
pub fn encode_value(value: f64, format: DataFormat, order: ByteOrder) -> Result<Vec<u8>> {
    if order.byte_width() != format.byte_width() {
        return Err(DecodeError::IncompatibleOrder { format, order });
    }

    let big_endian = order.is_big_endian();
    let mut bytes = match format {
        DataFormat::Int16 => {
            let v = checked_integer(value, format, i16::MIN.into(), i16::MAX.into())? as i16;
            if big_endian {
                v.to_be_bytes().to_vec()
            } else {
                v.to_le_bytes().to_vec()
            }
        },
        DataFormat::UInt16 => {
            let v = checked_integer(value, format, 0.0, u16::MAX.into())? as u16;
            if big_endian {
                v.to_be_bytes().to_vec()
            } else {
                v.to_le_bytes().to_vec()
            }
        },
        DataFormat::Int32 => {
            let v = checked_integer(value, format, i32::MIN.into(), i32::MAX.into())? as i32;
            if big_endian {
                v.to_be_bytes().to_vec()
            } else {
                v.to_le_bytes().to_vec()
            }
        },
        DataFormat::UInt32 => {
            let v = checked_integer(value, format, 0.0, u32::MAX.into())? as u32;
            if big_endian {
                v.to_be_bytes().to_vec()
            } else {
                v.to_le_bytes().to_vec()
            }
        },
        DataFormat::Float32 => {
            let v = value as f32;
            if big_endian {
                v.to_be_bytes().to_vec()
            } else {
                v.to_le_bytes().to_vec()
            }
        },
        DataFormat::Float64 => {
            if big_endian {
                value.to_be_bytes().to_vec()
            } else {
                value.to_le_bytes().to_vec()
            }
        },
    };

    if order.has_word_swap() {
        permute_in_place(&mut bytes);
    }
    Ok(bytes)
}

/// Flatten register words into wire bytes (each register high byte first)
pub fn registers_to_bytes(regs: &[u16]) -> Vec<u8> {
    regs.iter().flat_map(|reg| reg.to_be_bytes()).collect()
}

/// Group wire bytes into register words (each register high byte first)
pub fn bytes_to_registers(bytes: &[u8]) -> Result<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::length_mismatch(bytes.len() + 1, bytes.len()));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_encode_u32_all_orders() {
        let value = f64::from(0x12345678u32);
        let cases = [
            (ByteOrder::Abcd, [0x12, 0x34, 0x56, 0x78]),
            (ByteOrder::Dcba, [0x78, 0x56, 0x34, 0x12]),
            (ByteOrder::Cdab, [0x56, 0x78, 0x12, 0x34]),
            (ByteOrder::Badc, [0x34, 0x12, 0x78, 0x56]),
        ];
        for (order, expected) in cases {
            assert_eq!(
                encode_value(value, DataFormat::UInt32, order).unwrap(),
                expected,
                "{order}"
            );
        }
    }

    #[test]
    fn test_encode_u64_word_swap() {
        let value = f64::from_bits(0x0102030405060708);
        assert_eq!(
            encode_value(value, DataFormat::Float64, ByteOrder::Ghefcdab).unwrap(),
            [0x07, 0x08, 0x05, 0x06, 0x03, 0x04, 0x01, 0x02]
        );
        assert_eq!(
            encode_value(value, DataFormat::Float64, ByteOrder::Badcfehg).unwrap(),
            [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07]
        );
    }

    #[test]
    fn test_encode_int16() {
        assert_eq!(
            encode_value(-2.0, DataFormat::Int16, ByteOrder::Ab).unwrap(),
            [0xFF, 0xFE]
        );
        assert_eq!(
            encode_value(-2.0, DataFormat::Int16, ByteOrder::Ba).unwrap(),
            [0xFE, 0xFF]
        );
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert!(matches!(
            encode_value(70000.0, DataFormat::UInt16, ByteOrder::Ab),
            Err(DecodeError::ValueOutOfRange { .. })
        ));
        assert!(encode_value(-1.0, DataFormat::UInt32, ByteOrder::Abcd).is_err());
        assert!(encode_value(1.5, DataFormat::Int32, ByteOrder::Abcd).is_err());
        assert!(encode_value(f64::NAN, DataFormat::Int16, ByteOrder::Ab).is_err());
    }

    #[test]
    fn test_encode_rejects_incompatible_order() {
        assert_eq!(
            encode_value(1.0, DataFormat::Float64, ByteOrder::Abcd),
            Err(DecodeError::IncompatibleOrder {
                format: DataFormat::Float64,
                order: ByteOrder::Abcd,
            })
        );
    }

    #[test]
    fn test_registers_conversion() {
        let regs = [0x4218, 0xE400];
        let bytes = registers_to_bytes(&regs);
        assert_eq!(bytes, [0x42, 0x18, 0xE4, 0x00]);
        assert_eq!(bytes_to_registers(&bytes).unwrap(), regs);
        assert!(bytes_to_registers(&[0x01, 0x02, 0x03]).is_err());
    }
}
