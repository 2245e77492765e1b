//! Errors raised while drawing a payload.

use thiserror::Error;
use varplot_protocol::CodecError;
use varplot_protocol::edges::EdgeError;

/// A type renderer or the surface failed; shown as a render crash.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Encoded image data does not match its declared shape.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Graph edge sequences are inconsistent.
    #[error(transparent)]
    Edges(#[from] EdgeError),

    /// Parallel coordinate sequences differ in length.
    #[error("{what} has {actual} values but {expected} were expected")]
    LengthMismatch {
        /// Sequence that disagrees.
        what: &'static str,
        /// Length implied by the first sequence.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// The image has no pixels.
    #[error("image has an empty shape {rows}x{cols}")]
    EmptyImage {
        /// Declared rows.
        rows: usize,
        /// Declared columns.
        cols: usize,
    },

    /// The image is too large for an in-memory raster.
    #[error("image of {rows}x{cols} exceeds the raster size limit")]
    ImageTooLarge {
        /// Declared rows.
        rows: usize,
        /// Declared columns.
        cols: usize,
    },

    /// The surface rejected the figure.
    #[error("surface error: {message}")]
    Surface {
        /// Surface diagnostic.
        message: String,
    },

    /// A renderer panicked; the message is the panic payload.
    #[error("{message}")]
    Panicked {
        /// Panic message.
        message: String,
    },
}
