//! Error types raised while decoding wire data.

use thiserror::Error;

/// Errors raised by the buffer codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The text is not valid base64 even after cleanup.
    #[error("invalid base64 data: {message}")]
    InvalidBase64 {
        /// Decoder diagnostic.
        message: String,
    },

    /// The decoded byte count does not match the declared shape.
    #[error("expected {expected} bytes for the declared shape but decoded {actual}")]
    LengthMismatch {
        /// Byte count implied by the shape.
        expected: usize,
        /// Byte count actually decoded.
        actual: usize,
    },

    /// A float buffer length is not a multiple of four bytes.
    #[error("float buffer of {len} bytes is not a whole number of 4-byte values")]
    MisalignedFloats {
        /// Decoded byte count.
        len: usize,
    },
}

/// Errors raised while interpreting payload JSON.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The JSON did not describe any known payload.
    #[error("payload does not match any known kind: {source}")]
    Malformed {
        /// Underlying serde diagnostic.
        #[source]
        source: serde_json::Error,
    },

    /// The payload is a JSON value other than an object.
    #[error("payload must be a JSON object")]
    NotAnObject,

    /// An image shape is not `[rows, cols]` or `[rows, cols, channels]`.
    #[error("image shape must have two or three dimensions, got {dimensions}")]
    InvalidShape {
        /// Number of dimensions received.
        dimensions: usize,
    },

    /// An image declares zero channels.
    #[error("image shape declares zero channels")]
    ZeroChannels,
}

impl From<serde_json::Error> for PayloadError {
    fn from(source: serde_json::Error) -> Self {
        Self::Malformed { source }
    }
}
