//! Binary data processing for register payloads
//!
//! Provides the numeric format and byte/word order types, the byte permuter
//! and the numeric interpreter used by [`crate::Decoder`].
//!
//! # Design Principles
//!
//! - **Type-safe**: `DataFormat` and `ByteOrder` enums replace raw config strings
//! - **Non-mutating**: decoding never writes to the caller's buffer
//! - **Well-tested**: Property-based + table-driven tests

pub mod byte_order;
pub mod data_format;
pub mod encode;
pub mod interpret;
pub mod permute;

pub use byte_order::ByteOrder;
pub use data_format::DataFormat;
pub use encode::{bytes_to_registers, encode_value, registers_to_bytes};
pub use interpret::interpret;
pub use permute::{permute, permute_in_place};

/// Widest supported value in bytes (`float64`)
pub const MAX_WIDTH: usize = 8;
