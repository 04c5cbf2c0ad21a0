//! Decoder factory
//!
//! A [`Decoder`] is built once per `(format, order)` pair, typically once per
//! metric definition, and then invoked for every stored sample. It captures
//! only immutable configuration, so one instance can be shared freely across
//! threads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bytes::{self, encode_value, interpret, ByteOrder, DataFormat, MAX_WIDTH};
use crate::error::{DecodeError, Result};

/// How unrecognized order tokens are handled at construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Reject unknown tokens with [`DecodeError::UnrecognizedOrder`]
    #[default]
    Strict,
    /// Resolve unknown tokens to the little-endian, non-swapped order of the
    /// format's width (`BA`, `DCBA` or `HGFEDCBA`)
    ///
    /// Older metric tables relied on this implicit default. A warning is
    /// logged every time it applies.
    LegacyFallback,
}

impl OrderPolicy {
    /// Resolve an order token for `format` under this policy
    pub fn resolve(&self, format: DataFormat, token: &str) -> Result<ByteOrder> {
        match ByteOrder::parse(token) {
            Ok(order) => Ok(order),
            Err(err) => match self {
                OrderPolicy::Strict => Err(err),
                OrderPolicy::LegacyFallback => {
                    let fallback = ByteOrder::little_endian_for_width(format.byte_width())
                        .ok_or(err)?;
                    warn!(
                        "Unrecognized byte order '{}' for {}, falling back to {}",
                        token, format, fallback
                    );
                    Ok(fallback)
                },
            },
        }
    }
}

/// Immutable register decoder for one `(format, order)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decoder {
    format: DataFormat,
    order: ByteOrder,
}

impl Decoder {
    /// Build a decoder, checking that the order width matches the format
    pub fn new(format: DataFormat, order: ByteOrder) -> Result<Self> {
        if order.byte_width() != format.byte_width() {
            return Err(DecodeError::IncompatibleOrder { format, order });
        }
        Ok(Self { format, order })
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Expected input width in bytes
    pub fn byte_width(&self) -> usize {
        self.format.byte_width()
    }

    /// Decode one sample
    ///
    /// The input is copied before the pair swap, so the caller's buffer is
    /// never modified and decoding the same buffer twice gives the same value.
    pub fn decode(&self, bytes: &[u8]) -> Result<f64> {
        let width = self.format.byte_width();
        if bytes.len() != width {
            return Err(DecodeError::length_mismatch(width, bytes.len()));
        }

        let mut buf = [0u8; MAX_WIDTH];
        let buf = &mut buf[..width];
        buf.copy_from_slice(bytes);
        if self.order.has_word_swap() {
            bytes::permute_in_place(buf);
        }

        interpret(buf, self.format, self.order.is_big_endian())
    }

    /// Decode from register words as read off the wire
    pub fn decode_registers(&self, regs: &[u16]) -> Result<f64> {
        let expected = self.format.register_count();
        if regs.len() != expected {
            return Err(DecodeError::length_mismatch(
                expected * 2,
                regs.len() * 2,
            ));
        }

        let mut buf = [0u8; MAX_WIDTH];
        for (chunk, reg) in buf.chunks_exact_mut(2).zip(regs) {
            chunk.copy_from_slice(&reg.to_be_bytes());
        }
        self.decode(&buf[..self.format.byte_width()])
    }

    /// Encode a value into the byte layout this decoder reads
    pub fn encode(&self, value: f64) -> Result<Vec<u8>> {
        encode_value(value, self.format, self.order)
    }
}

/// Build a decoder from configuration tokens, rejecting unknown orders
pub fn make_decoder(format: &str, order: &str) -> Result<Decoder> {
    make_decoder_with_policy(format, order, OrderPolicy::Strict)
}

/// Build a decoder from configuration tokens
pub fn make_decoder_with_policy(format: &str, order: &str, policy: OrderPolicy) -> Result<Decoder> {
    let format = DataFormat::parse(format)?;
    let order = policy.resolve(format, order)?;
    Decoder::new(format, order)
}

/// Memoizes one decoder per distinct `(format, order)` token pair
///
/// Construction failures are cached too, so a malformed pair shared by many
/// metrics is validated once and reported consistently.
#[derive(Debug, Default)]
pub struct DecoderCache {
    policy: OrderPolicy,
    entries: HashMap<(String, String), Result<Decoder>>,
}

impl DecoderCache {
    pub fn new(policy: OrderPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    /// Get or build the decoder for a token pair
    pub fn get(&mut self, format: &str, order: &str) -> Result<Decoder> {
        let policy = self.policy;
        self.entries
            .entry((format.to_string(), order.to_string()))
            .or_insert_with(|| {
                debug!("Building decoder for format={} order={}", format, order);
                make_decoder_with_policy(format, order, policy)
            })
            .clone()
    }

    /// Number of distinct token pairs seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
