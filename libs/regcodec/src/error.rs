//! Register codec error types
//!
//! Configuration errors are raised when a decoder is built and belong to the
//! metric definition. Length errors are raised per sample and never abort a
//! batch.

use thiserror::Error;

use crate::bytes::{ByteOrder, DataFormat};

/// Result type for regcodec operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Register codec errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Format token is not one of the supported numeric encodings
    #[error("Unsupported data format: '{0}'")]
    UnsupportedFormat(String),

    /// Order token is not a recognized byte/word order
    #[error("Unrecognized byte order: '{0}'")]
    UnrecognizedOrder(String),

    /// Order width does not match the width of the format
    #[error(
        "Byte order {order} ({} bytes) is incompatible with {format} ({} bytes)",
        .order.byte_width(),
        .format.byte_width()
    )]
    IncompatibleOrder { format: DataFormat, order: ByteOrder },

    /// Input byte count does not match the format width
    #[error("Length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Value cannot be represented in the target format
    #[error("Value {value} out of range for {format}")]
    ValueOutOfRange { format: DataFormat, value: f64 },
}

impl DecodeError {
    pub fn unsupported_format(token: impl Into<String>) -> Self {
        DecodeError::UnsupportedFormat(token.into())
    }

    pub fn unrecognized_order(token: impl Into<String>) -> Self {
        DecodeError::UnrecognizedOrder(token.into())
    }

    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        DecodeError::LengthMismatch { expected, actual }
    }

    /// Check if this error belongs to the decoder configuration rather than
    /// to a single sample
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DecodeError::UnsupportedFormat(_)
                | DecodeError::UnrecognizedOrder(_)
                | DecodeError::IncompatibleOrder { .. }
        )
    }
}
