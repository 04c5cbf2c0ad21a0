//! Register byte decoder
//!
//! Converts raw fixed-width register payloads read from field devices into
//! numeric values, given a declared numeric format and byte/word order.
//!
//! # Architecture
//!
//! This library provides:
//! - **Bytes**: `DataFormat`, `ByteOrder`, the pair-swap permuter, the numeric
//!   interpreter and the inverse encoder
//! - **Decoder**: factory building immutable, shareable decoders from
//!   configuration tokens
//! - **Series**: decoding of stored samples into per-metric series grouped by
//!   device, with per-metric configuration errors and per-sample rejects
//!
//! ```
//! use regcodec::make_decoder;
//!
//! let decoder = make_decoder("float32", "ABCD")?;
//! let value = decoder.decode(&[0x42, 0x18, 0xE4, 0x00])?;
//! assert!((value - 38.2226563).abs() < 1e-6);
//! # Ok::<(), regcodec::DecodeError>(())
//! ```

pub mod bytes;
pub mod decoder;
pub mod error;
pub mod series;

// Re-export core types
pub use bytes::{ByteOrder, DataFormat};
pub use decoder::{make_decoder, make_decoder_with_policy, Decoder, DecoderCache, OrderPolicy};
pub use error::{DecodeError, Result};
pub use series::{
    DataPoint, DecodeStats, DeviceSeries, MetricConfigError, MetricDefinition, MetricSeries,
    RawSample, SampleOutcome, SeriesBuilder, SeriesFilter, SeriesReport,
};
