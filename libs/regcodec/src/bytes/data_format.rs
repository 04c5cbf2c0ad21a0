//! Numeric formats a register payload can carry

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Numeric encoding of a register payload
///
/// The width is fixed per format: one register (2 bytes) for the 16-bit
/// integers, two registers for the 32-bit types and four for `Float64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataFormat {
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl DataFormat {
    pub const ALL: [DataFormat; 6] = [
        DataFormat::Int16,
        DataFormat::UInt16,
        DataFormat::Int32,
        DataFormat::UInt32,
        DataFormat::Float32,
        DataFormat::Float64,
    ];

    /// Parse a format token
    ///
    /// Matching is case-insensitive. Besides the canonical tokens
    /// (`int16`, `uint16`, `int32`, `uint32`, `float32`, `float64`) the
    /// aliases common in register maps are accepted:
    /// - "i16", "short" → Int16
    /// - "u16", "word" → UInt16
    /// - "i32", "long" → Int32
    /// - "u32", "dword" → UInt32
    /// - "f32", "float", "real" → Float32
    /// - "f64", "double", "lreal" → Float64
    pub fn parse(token: &str) -> Result<Self, DecodeError> {
        let normalized = token.trim().to_lowercase();
        match normalized.as_str() {
            "int16" | "i16" | "short" => Ok(Self::Int16),
            "uint16" | "u16" | "word" => Ok(Self::UInt16),
            "int32" | "i32" | "long" => Ok(Self::Int32),
            "uint32" | "u32" | "dword" => Ok(Self::UInt32),
            "float32" | "f32" | "float" | "real" => Ok(Self::Float32),
            "float64" | "f64" | "double" | "lreal" => Ok(Self::Float64),
            _ => Err(DecodeError::unsupported_format(token)),
        }
    }

    /// Canonical token
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Number of payload bytes
    pub fn byte_width(&self) -> usize {
        match self {
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Number of 16-bit registers the value occupies
    pub fn register_count(&self) -> usize {
        self.byte_width() / 2
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Self::Int16 | Self::Int32 | Self::Float32 | Self::Float64
        )
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataFormat {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DataFormat> for String {
    fn from(format: DataFormat) -> Self {
        format.as_str().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_tokens() {
        for format in DataFormat::ALL {
            assert_eq!(DataFormat::parse(format.as_str()).unwrap(), format);
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(DataFormat::parse("FLOAT32").unwrap(), DataFormat::Float32);
        assert_eq!(DataFormat::parse("word").unwrap(), DataFormat::UInt16);
        assert_eq!(DataFormat::parse(" dword ").unwrap(), DataFormat::UInt32);
        assert_eq!(DataFormat::parse("double").unwrap(), DataFormat::Float64);
        assert_eq!(DataFormat::parse("short").unwrap(), DataFormat::Int16);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            DataFormat::parse("int24"),
            Err(DecodeError::UnsupportedFormat("int24".to_string()))
        );
        assert!(DataFormat::parse("").is_err());
    }

    #[test]
    fn test_widths() {
        assert_eq!(DataFormat::Int16.byte_width(), 2);
        assert_eq!(DataFormat::UInt16.byte_width(), 2);
        assert_eq!(DataFormat::Int32.byte_width(), 4);
        assert_eq!(DataFormat::UInt32.byte_width(), 4);
        assert_eq!(DataFormat::Float32.byte_width(), 4);
        assert_eq!(DataFormat::Float64.byte_width(), 8);
        assert_eq!(DataFormat::Float64.register_count(), 4);
    }

    #[test]
    fn test_serde_tokens() {
        let json = serde_json::to_string(&DataFormat::UInt32).unwrap();
        assert_eq!(json, "\"uint32\"");
        let parsed: DataFormat = serde_json::from_str("\"Float64\"").unwrap();
        assert_eq!(parsed, DataFormat::Float64);
        assert!(serde_json::from_str::<DataFormat>("\"bcd\"").is_err());
    }
}
