//! Byte/word order tokens for register payloads
//!
//! Each order carries two independent properties: whether the final
//! reinterpretation is big-endian, and whether adjacent bytes are swapped
//! pairwise before it. The combination produces every ordering listed below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Byte/word order of a 16/32/64-bit register payload
///
/// # Naming Convention
/// Uses ABCD notation where A is the most significant byte. The token spells
/// the order in which the bytes arrive on the wire.
///
/// For 32-bit value `0x12345678`:
/// - `ABCD`: [0x12, 0x34, 0x56, 0x78] (big-endian)
/// - `DCBA`: [0x78, 0x56, 0x34, 0x12] (little-endian)
/// - `CDAB`: [0x56, 0x78, 0x12, 0x34] (word-swapped, common in Modbus PLCs)
/// - `BADC`: [0x34, 0x12, 0x78, 0x56] (byte-swapped words)
///
/// | Token | Width | Big-endian | Pair swap |
/// |---|---|---|---|
/// | AB | 2 | yes | no |
/// | BA / CD | 2 | no | no |
/// | ABCD | 4 | yes | no |
/// | BADC | 4 | yes | yes |
/// | CDAB | 4 | no | yes |
/// | DCBA | 4 | no | no |
/// | ABCDEFGH | 8 | yes | no |
/// | BADCFEHG | 8 | yes | yes |
/// | GHEFCDAB | 8 | no | yes |
/// | HGFEDCBA | 8 | no | no |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ByteOrder {
    /// 16-bit big-endian: AB
    Ab,
    /// 16-bit little-endian: BA (legacy configurations also spell it CD)
    Ba,
    /// 32-bit big-endian: ABCD
    Abcd,
    /// 32-bit big-endian words with swapped bytes: BADC
    Badc,
    /// 32-bit word-swapped: CDAB
    Cdab,
    /// 32-bit little-endian: DCBA
    Dcba,
    /// 64-bit big-endian: ABCDEFGH
    Abcdefgh,
    /// 64-bit big-endian words with swapped bytes: BADCFEHG
    Badcfehg,
    /// 64-bit word-swapped: GHEFCDAB
    Ghefcdab,
    /// 64-bit little-endian: HGFEDCBA
    Hgfedcba,
}

impl ByteOrder {
    pub const ALL: [ByteOrder; 10] = [
        ByteOrder::Ab,
        ByteOrder::Ba,
        ByteOrder::Abcd,
        ByteOrder::Badc,
        ByteOrder::Cdab,
        ByteOrder::Dcba,
        ByteOrder::Abcdefgh,
        ByteOrder::Badcfehg,
        ByteOrder::Ghefcdab,
        ByteOrder::Hgfedcba,
    ];

    /// Parse an order token
    ///
    /// Matching is case-insensitive and ignores `-` and `_` separators, so
    /// "AB-CD", "cd_ab" and "CDAB" are all accepted.
    pub fn parse(token: &str) -> Result<Self, DecodeError> {
        let normalized: String = token
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "AB" => Ok(Self::Ab),
            "BA" | "CD" => Ok(Self::Ba),
            "ABCD" => Ok(Self::Abcd),
            "BADC" => Ok(Self::Badc),
            "CDAB" => Ok(Self::Cdab),
            "DCBA" => Ok(Self::Dcba),
            "ABCDEFGH" => Ok(Self::Abcdefgh),
            "BADCFEHG" => Ok(Self::Badcfehg),
            "GHEFCDAB" => Ok(Self::Ghefcdab),
            "HGFEDCBA" => Ok(Self::Hgfedcba),
            _ => Err(DecodeError::unrecognized_order(token)),
        }
    }

    /// Little-endian, non-swapped order for a payload width
    ///
    /// This is what unrecognized tokens resolve to under
    /// [`crate::OrderPolicy::LegacyFallback`].
    pub fn little_endian_for_width(width: usize) -> Option<Self> {
        match width {
            2 => Some(Self::Ba),
            4 => Some(Self::Dcba),
            8 => Some(Self::Hgfedcba),
            _ => None,
        }
    }

    /// Canonical token
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ab => "AB",
            Self::Ba => "BA",
            Self::Abcd => "ABCD",
            Self::Badc => "BADC",
            Self::Cdab => "CDAB",
            Self::Dcba => "DCBA",
            Self::Abcdefgh => "ABCDEFGH",
            Self::Badcfehg => "BADCFEHG",
            Self::Ghefcdab => "GHEFCDAB",
            Self::Hgfedcba => "HGFEDCBA",
        }
    }

    /// Payload width in bytes implied by the token
    pub fn byte_width(&self) -> usize {
        match self {
            Self::Ab | Self::Ba => 2,
            Self::Abcd | Self::Badc | Self::Cdab | Self::Dcba => 4,
            Self::Abcdefgh | Self::Badcfehg | Self::Ghefcdab | Self::Hgfedcba => 8,
        }
    }

    /// Check if the final reinterpretation reads the most significant byte first
    pub fn is_big_endian(&self) -> bool {
        matches!(
            self,
            Self::Ab | Self::Abcd | Self::Badc | Self::Abcdefgh | Self::Badcfehg
        )
    }

    /// Check if adjacent bytes are swapped pairwise before reinterpretation
    pub fn has_word_swap(&self) -> bool {
        matches!(
            self,
            Self::Badc | Self::Cdab | Self::Badcfehg | Self::Ghefcdab
        )
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ByteOrder {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ByteOrder {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ByteOrder> for String {
    fn from(order: ByteOrder) -> Self {
        order.as_str().to_string()
    }
}
