//! Error types for the wire protocol.

use std::io;
use thiserror::Error;

/// Result type alias for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors produced while framing or unframing messages.
#[derive(Debug, Error)]
pub enum WireError {
    /// Message could not be serialized to JSON.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Payload is larger than the 4-byte length prefix can describe.
    #[error("payload of {size} bytes does not fit a 4-byte length prefix")]
    PayloadTooLarge {
        /// Byte length of the encoded payload.
        size: usize,
    },

    /// Declared frame size exceeds the codec's configured maximum.
    #[error("frame size {size} exceeds maximum {max}")]
    FrameTooLarge {
        /// Declared size of the frame payload.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Underlying transport failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
