//! Wire types shared by the varplot host and renderer.
//!
//! The protocol has three hops. The debuggee-side extractor answers an
//! evaluate request with a small [`StagedPointer`] naming a temporary file;
//! that file holds a [`Payload`] which the host forwards verbatim to the
//! renderer; the renderer announces itself once with
//! [`RendererMessage::Ready`]. Bulk buffers travel as base64 text and are
//! decoded with the helpers in [`codec`]. Graph edges use the sentinel-break
//! convention implemented in [`edges`].

pub mod codec;
pub mod edges;
mod errors;
mod message;
mod payload;

pub use errors::{CodecError, PayloadError};
pub use message::{RendererMessage, StagedPointer};
pub use payload::{
    ArrayPayload, DEFAULT_ORIG_MAX, DEFAULT_ORIG_MIN, GraphPayload, ImagePayload, ImageShape,
    ObjectPayload, Payload, PayloadKind, Points2dPayload, Points3dPayload,
};
