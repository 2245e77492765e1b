//! Base64 codec for image and float buffers.
//!
//! Encoding always produces canonical padded base64. Decoding is lenient in
//! the way the renderer needs: characters outside the base64 alphabet (line
//! breaks, stray quotes from a remote `repr`) are discarded and missing
//! padding is tolerated. Length checks against the declared shape are strict.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;

use crate::errors::CodecError;
use crate::payload::ImageShape;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// Owned image samples in row-major, channel-interleaved order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    shape: ImageShape,
    samples: Vec<u8>,
}

impl ImageBuffer {
    /// Wraps raw samples, checking they match the shape.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::LengthMismatch`] when the sample count differs
    /// from `rows * cols * channels`.
    pub fn new(shape: ImageShape, samples: Vec<u8>) -> Result<Self, CodecError> {
        check_len(shape.sample_count(), samples.len())?;
        Ok(Self { shape, samples })
    }

    /// Image dimensions.
    #[must_use]
    pub const fn shape(&self) -> ImageShape {
        self.shape
    }

    /// Raw samples.
    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Samples of the pixel at `(row, col)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, row: usize, col: usize) -> Option<&[u8]> {
        let channels = self.shape.channels();
        pixel_slice(&self.samples, self.shape, row, col, channels)
    }

    /// Consumes the buffer and returns the samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }
}

/// Encodes raw bytes as padded base64.
#[must_use]
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes base64 text, discarding characters outside the alphabet.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBase64`] when the cleaned text is still not
/// decodable (for example a dangling single character).
pub fn decode_bytes(text: &str) -> Result<Vec<u8>, CodecError> {
    let cleaned: String = text
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '+' || *ch == '/')
        .collect();
    LENIENT
        .decode(cleaned.as_bytes())
        .map_err(|error| CodecError::InvalidBase64 {
            message: error.to_string(),
        })
}

/// Encodes floats as base64 of little-endian `f32` bytes.
#[must_use]
pub fn encode_f32_le(values: &[f32]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|value| value.to_le_bytes()).collect();
    encode_bytes(&bytes)
}

/// Decodes base64 of little-endian `f32` bytes.
///
/// # Errors
///
/// Returns [`CodecError::MisalignedFloats`] when the byte count is not a
/// multiple of four, or [`CodecError::InvalidBase64`] for undecodable text.
pub fn decode_f32_le(text: &str) -> Result<Vec<f32>, CodecError> {
    let bytes = decode_bytes(text)?;
    let chunks = bytes.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return Err(CodecError::MisalignedFloats { len: bytes.len() });
    }
    Ok(chunks
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Encodes an image buffer's samples.
#[must_use]
pub fn encode_image(buffer: &ImageBuffer) -> String {
    encode_bytes(buffer.samples())
}

/// Decodes display bytes for the given shape.
///
/// # Errors
///
/// Returns [`CodecError::LengthMismatch`] when the decoded byte count is not
/// exactly `rows * cols * channels`.
pub fn decode_image(shape: ImageShape, text: &str) -> Result<ImageBuffer, CodecError> {
    ImageBuffer::new(shape, decode_bytes(text)?)
}

/// Decodes exact per-sample values for the given shape.
///
/// # Errors
///
/// Returns [`CodecError::LengthMismatch`] (counted in values) when the buffer
/// does not hold exactly one float per sample.
pub fn decode_real_values(shape: ImageShape, text: &str) -> Result<Vec<f32>, CodecError> {
    let values = decode_f32_le(text)?;
    check_len(shape.sample_count(), values.len())?;
    Ok(values)
}

/// Returns the channel slice for `(row, col)` in a row-major sample buffer.
pub(crate) fn pixel_slice<T>(
    samples: &[T],
    shape: ImageShape,
    row: usize,
    col: usize,
    channels: usize,
) -> Option<&[T]> {
    if row >= shape.rows() || col >= shape.cols() {
        return None;
    }
    let start = (row * shape.cols() + col) * channels;
    samples.get(start..start + channels)
}

/// Channel values of `(row, col)` in a decoded real-value buffer.
#[must_use]
pub fn real_pixel(values: &[f32], shape: ImageShape, row: usize, col: usize) -> Option<&[f32]> {
    pixel_slice(values, shape, row, col, shape.channels())
}

const fn check_len(expected: usize, actual: usize) -> Result<(), CodecError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CodecError::LengthMismatch { expected, actual })
    }
}
