//! Renderer side of varplot.
//!
//! A [`RenderRouter`] receives payloads, tears down the previous plot target
//! and draws the new payload with the renderer for its kind on the next paint
//! tick. Renderers describe what to draw as a [`Figure`] handed to a
//! [`ChartSurface`]; [`HeadlessSurface`] is the in-memory implementation used
//! by the CLI and the tests. Interaction handlers live in a
//! [`SubscriptionRegistry`] owned by the target, so replacing the target
//! disposes them. [`RendererHandle`] runs the whole thing on its own thread
//! behind `crossbeam-channel` queues.

mod errors;
pub mod figure;
pub mod format;
mod histogram;
pub mod mapper;
mod raster;
mod renderer_loop;
mod renderers;
mod router;
mod session;
mod subscription;
mod surface;
mod tooltip;

pub use errors::RenderError;
pub use figure::Figure;
pub use histogram::bin_values;
pub use raster::DecodedImage;
pub use renderer_loop::{Frame, RendererHandle, RendererInput, RendererOutput};
pub use renderers::RenderOptions;
pub use router::{RENDERING_STATUS, RenderRouter};
pub use session::{RenderSession, RenderState, SurfaceFactory};
pub use subscription::{
    EventKind, InteractionHandler, SubscriptionId, SubscriptionRegistry, SurfaceEvent,
};
pub use surface::{ChartSurface, HeadlessSurface, Relayout};
pub use tooltip::{TOOLTIP_OFFSET, Tooltip};
