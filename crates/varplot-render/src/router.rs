//! Routes payloads to the type renderers.
//!
//! Routing is split in two halves the way a browser splits work across
//! frames: [`RenderRouter::route`] tears the previous target down at once and
//! queues the payload, and [`RenderRouter::on_paint_tick`] draws it. A payload
//! routed before the tick replaces the queued one, so only the latest is ever
//! drawn.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};
use varplot_protocol::Payload;

use crate::errors::RenderError;
use crate::renderers::{
    Canvas, RenderOptions, render_array, render_graph, render_image, render_object,
    render_points_2d, render_points_3d,
};
use crate::session::{RenderSession, RenderState};
use crate::surface::ChartSurface;

const ROUTER_TARGET: &str = "varplot_render::router";

/// Status shown between routing and the next paint tick.
pub const RENDERING_STATUS: &str = "Rendering...";

/// Dispatches payloads onto a [`RenderSession`].
pub struct RenderRouter<S: ChartSurface> {
    session: RenderSession<S>,
    options: RenderOptions,
    pending: Option<Payload>,
}

impl<S: ChartSurface> RenderRouter<S> {
    /// Wraps `session`.
    #[must_use]
    pub const fn new(session: RenderSession<S>, options: RenderOptions) -> Self {
        Self {
            session,
            options,
            pending: None,
        }
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &RenderSession<S> {
        &self.session
    }

    /// Mutable access for pointer and relayout forwarding.
    pub const fn session_mut(&mut self) -> &mut RenderSession<S> {
        &mut self.session
    }

    /// Whether a payload waits for the next paint tick.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accepts a payload.
    ///
    /// An error payload only updates the status line, and leaves the target
    /// `Empty` when it displaces a payload still waiting to be drawn. Any other payload
    /// shows [`RENDERING_STATUS`], replaces the plot target and waits for
    /// [`Self::on_paint_tick`].
    pub fn route(&mut self, payload: Payload) {
        if let Payload::Error { message } = payload {
            debug!(target: ROUTER_TARGET, %message, "error payload");
            if self.pending.take().is_some() {
                self.session.set_state(RenderState::Empty);
            }
            self.session.set_status(format!("Error: {message}"));
            return;
        }

        debug!(target: ROUTER_TARGET, kind = payload.kind().as_str(), "routing payload");
        self.session.set_status(RENDERING_STATUS);
        self.session.set_state(RenderState::Rendering);
        self.session.rebuild_target();
        self.pending = Some(payload);
    }

    /// Draws the queued payload, if any. Render failures, including panics,
    /// end up in the status line and never escape.
    pub fn on_paint_tick(&mut self) {
        let Some(payload) = self.pending.take() else {
            return;
        };
        let options = self.options;
        let target = &mut self.session.target;
        let mut canvas = Canvas {
            surface: &mut target.surface,
            subscriptions: &mut target.subscriptions,
            options,
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| draw(&payload, &mut canvas)))
            .unwrap_or_else(|panic| {
                Err(RenderError::Panicked {
                    message: panic_message(panic.as_ref()),
                })
            });

        match outcome {
            Ok(status) => {
                self.session.set_status(status);
                self.session.set_state(RenderState::Displayed);
            }
            Err(error) => {
                warn!(target: ROUTER_TARGET, %error, "render failed");
                self.session.set_status(format!("Render Crash: {error}"));
                self.session.set_state(RenderState::Error);
            }
        }
    }
}

impl<S: ChartSurface> std::fmt::Debug for RenderRouter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderRouter")
            .field("session", &self.session)
            .field("options", &self.options)
            .field("pending", &self.pending.as_ref().map(Payload::kind))
            .finish()
    }
}

fn draw(payload: &Payload, canvas: &mut Canvas<'_>) -> Result<String, RenderError> {
    match payload {
        Payload::Image(image) => render_image(image, canvas),
        Payload::Points2d(points) => render_points_2d(points, canvas),
        Payload::Points3d(points) => render_points_3d(points, canvas),
        Payload::Graph2d(graph) => render_graph(graph, false, canvas),
        Payload::Graph3d(graph) => render_graph(graph, true, canvas),
        Payload::Array1d(array) => render_array(array, canvas),
        Payload::Object(object) => Ok(render_object(object, canvas)),
        Payload::Error { message } => Ok(format!("Error: {message}")),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("renderer panicked"))
}
